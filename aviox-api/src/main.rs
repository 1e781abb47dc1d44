use anyhow::Context;
use aviox_api::{app, AppState, SearchSettings};
use aviox_offer::FlightSearch;
use aviox_store::{app_config::Config, AmadeusClient, OpenAiClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aviox_api=debug,aviox_offer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting AvioX API on port {}", config.server.port);

    if config.llm.api_key.is_empty() {
        tracing::warn!("llm.api_key is empty; set AVIOX__LLM__API_KEY");
    }
    if config.amadeus.client_id.is_empty() || config.amadeus.client_secret.is_empty() {
        tracing::warn!("Amadeus credentials are empty; set AVIOX__AMADEUS__CLIENT_ID and AVIOX__AMADEUS__CLIENT_SECRET");
    }

    let model = OpenAiClient::new(&config.llm).context("Failed to build language model client")?;
    let inventory = AmadeusClient::new(&config.amadeus).context("Failed to build inventory client")?;

    let search = FlightSearch::new(
        Arc::new(model),
        Arc::new(inventory),
        config.search.lookup_defaults(),
    );
    let settings = SearchSettings {
        reference_date: config.search.reference_date,
        display: config.search.display(),
    };
    if let Some(date) = settings.reference_date {
        tracing::info!("Using fixed reference date {}", date);
    }

    let app = app(AppState::new(search, settings));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
