use axum::{extract::State, routing::post, Json, Router};
use aviox_core::inventory::{decode_offers, RawOffer};
use aviox_core::query::StructuredQuery;
use aviox_offer::{rerank, DisplayConfig, PresentableOffer, SortKey, StopFilter};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use crate::{error::AppError, state::AppState};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub reference_date: Option<NaiveDate>,
    pub sort_by: Option<SortKey>,
    pub stops: Option<StopFilter>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: StructuredQuery,
    pub raw_offers: Vec<RawOffer>,
    pub offers: Vec<PresentableOffer>,
    pub empty: bool,
}

#[derive(Debug, Deserialize)]
pub struct RerankRequest {
    /// Decoded record by record; a mistyped one is dropped, not the request.
    pub raw_offers: Vec<serde_json::Value>,
    pub sort_by: Option<SortKey>,
    pub stops: Option<StopFilter>,
}

#[derive(Debug, Serialize)]
pub struct RerankResponse {
    pub offers: Vec<PresentableOffer>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/flights/search", post(search_flights))
        .route("/v1/flights/rerank", post(rerank_offers))
}

fn display_config(defaults: DisplayConfig, sort_by: Option<SortKey>, stops: Option<StopFilter>) -> DisplayConfig {
    DisplayConfig {
        sort_by: sort_by.unwrap_or(defaults.sort_by),
        stops: stops.unwrap_or(defaults.stops),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/flights/search
/// Free-text query in, ranked offers out
async fn search_flights(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let reference_date = state.settings.reference_date(req.reference_date);
    let config = display_config(state.settings.display, req.sort_by, req.stops);

    let results = state.search.search_with(&req.query, reference_date, &config).await?;
    if results.is_empty() {
        tracing::info!("No offers for {}", results.query.route_label());
    }

    let empty = results.is_empty();
    Ok(Json(SearchResponse {
        query: results.query,
        raw_offers: results.raw_offers,
        offers: results.offers,
        empty,
    }))
}

/// POST /v1/flights/rerank
/// Re-applies sort and stop filter to offers from an earlier search
async fn rerank_offers(
    State(state): State<AppState>,
    Json(req): Json<RerankRequest>,
) -> Json<RerankResponse> {
    let config = display_config(state.settings.display, req.sort_by, req.stops);
    let raw_offers = decode_offers(req.raw_offers);
    Json(RerankResponse { offers: rerank(&raw_offers, &config) })
}
