use crate::app_config::AmadeusConfig;
use async_trait::async_trait;
use aviox_core::inventory::{self, InventoryError, InventoryLookup, InventoryRequest, RawOffer};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

// Refresh a little before the provider says the token dies.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(30);

/// Flight-offers search against the Amadeus self-service API
pub struct AmadeusClient {
    http: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<AccessToken>>,
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenGrant {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct OffersPage {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrors {
    #[serde(default)]
    errors: Vec<ProviderIssue>,
}

#[derive(Debug, Deserialize)]
struct ProviderIssue {
    title: Option<String>,
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthFailure {
    error_description: Option<String>,
}

impl AmadeusClient {
    pub fn new(config: &AmadeusConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token: Mutex::new(None),
        })
    }

    /// Drops the cached token so the next lookup asks for a fresh grant.
    async fn forget_token(&self) {
        if self.token.lock().await.take().is_some() {
            warn!("Inventory rejected the cached access token");
        }
    }

    /// Cached bearer token, fetched with client credentials when missing or stale.
    async fn access_token(&self) -> Result<String, InventoryError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.expires_at > Instant::now()) {
            return Ok(token.value.clone());
        }

        let response = self
            .http
            .post(format!("{}/v1/security/oauth2/token", self.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;
        let grant = decode_grant(status, &body)?;

        let lifetime = Duration::from_secs(grant.expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        info!("Inventory access token granted for {}s", grant.expires_in);
        *cached = Some(AccessToken {
            value: grant.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(grant.access_token)
    }
}

#[async_trait]
impl InventoryLookup for AmadeusClient {
    async fn find_offers(&self, request: &InventoryRequest) -> Result<Vec<RawOffer>, InventoryError> {
        let token = self.access_token().await?;

        let params = [
            ("originLocationCode", request.origin.to_string()),
            ("destinationLocationCode", request.destination.to_string()),
            ("departureDate", request.date.format("%Y-%m-%d").to_string()),
            ("adults", request.passenger_count.to_string()),
            ("max", request.max_results.to_string()),
        ];

        let response = self
            .http
            .get(format!("{}/v2/shopping/flight-offers", self.base_url))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| InventoryError::Transport(e.to_string()))?;
        if status == StatusCode::UNAUTHORIZED {
            self.forget_token().await;
        }
        decode_page(status, &body)
    }
}

fn decode_grant(status: StatusCode, body: &str) -> Result<TokenGrant, InventoryError> {
    if !status.is_success() {
        let reason = serde_json::from_str::<AuthFailure>(body)
            .ok()
            .and_then(|failure| failure.error_description)
            .unwrap_or_else(|| format!("token endpoint returned {}", status));
        return Err(InventoryError::Authentication(reason));
    }
    serde_json::from_str(body).map_err(|e| InventoryError::Authentication(e.to_string()))
}

/// Provider offers, or the provider's own error text.
fn decode_page(status: StatusCode, body: &str) -> Result<Vec<RawOffer>, InventoryError> {
    if !status.is_success() {
        let detail = provider_detail(body)
            .unwrap_or_else(|| format!("inventory provider returned {}", status));
        return Err(InventoryError::Provider(detail));
    }

    let page: OffersPage = serde_json::from_str(body)
        .map_err(|e| InventoryError::Transport(format!("unreadable offer page: {}", e)))?;

    Ok(inventory::decode_offers(page.data))
}

fn provider_detail(body: &str) -> Option<String> {
    let parsed: ProviderErrors = serde_json::from_str(body).ok()?;
    let details: Vec<String> = parsed
        .errors
        .into_iter()
        .filter_map(|issue| issue.detail.or(issue.title))
        .collect();
    if details.is_empty() {
        None
    } else {
        Some(details.join("; "))
    }
}
