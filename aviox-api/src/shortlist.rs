use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use aviox_offer::PresentableOffer;
use aviox_store::ShortlistEntry;
use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/v1/shortlist",
        get(list_shortlist).post(add_to_shortlist).delete(clear_shortlist),
    )
}

/// GET /v1/shortlist
async fn list_shortlist(State(state): State<AppState>) -> Json<Vec<ShortlistEntry>> {
    let shortlist = state.shortlist.read().await;
    Json(shortlist.entries().to_vec())
}

/// POST /v1/shortlist
/// Saves a selected offer
async fn add_to_shortlist(
    State(state): State<AppState>,
    Json(offer): Json<PresentableOffer>,
) -> Result<(StatusCode, Json<ShortlistEntry>), AppError> {
    if offer.airline.trim().is_empty() || offer.currency.trim().is_empty() {
        return Err(AppError::ValidationError("Offer needs an airline and a currency".to_string()));
    }

    let entry = ShortlistEntry::from_offer(&offer);
    state.shortlist.write().await.append(entry.clone());
    tracing::info!("Shortlisted {} {} {} ({})", entry.airline, entry.price, entry.currency, entry.route);

    Ok((StatusCode::CREATED, Json(entry)))
}

/// DELETE /v1/shortlist
async fn clear_shortlist(State(state): State<AppState>) -> StatusCode {
    let removed = state.shortlist.write().await.clear();
    tracing::info!("Cleared {} shortlist entries", removed);
    StatusCode::NO_CONTENT
}
