use aviox_core::SearchError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    Search(SearchError),
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        Self::Search(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, error_message, retryable) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg, false),
            AppError::Search(err) => {
                let retryable = err.is_retryable();
                let (status, kind) = match &err {
                    SearchError::EmptyQuery => (StatusCode::BAD_REQUEST, "empty_query"),
                    SearchError::MalformedQuery { raw, .. } => {
                        tracing::warn!("Unusable structured answer: {}", raw);
                        (StatusCode::UNPROCESSABLE_ENTITY, "malformed_query")
                    }
                    SearchError::NormalizationFailed(e) => {
                        tracing::error!("Normalization failed: {}", e);
                        (StatusCode::BAD_GATEWAY, "normalization_failed")
                    }
                    SearchError::InventoryUnavailable(e) => {
                        tracing::error!("Inventory unavailable: {}", e);
                        (StatusCode::BAD_GATEWAY, "inventory_unavailable")
                    }
                };
                (status, kind, err.to_string(), retryable)
            }
        };

        let body = Json(json!({
            "error": error_message,
            "kind": kind,
            "retryable": retryable,
        }));

        (status, body).into_response()
    }
}
