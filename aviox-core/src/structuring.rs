use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

/// What the text-to-structure model is asked to do.
#[derive(Debug, Clone, Serialize)]
pub struct StructuringRequest {
    /// Output-shape contract and reference date, sent as the system prompt.
    pub instruction: String,
    /// The user's travel request, verbatim.
    pub text: String,
    pub reference_date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Model request failed: {0}")]
    Transport(String),
    #[error("Model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Model returned no content")]
    EmptyResponse,
    #[error("Model refused the request: {0}")]
    Refused(String),
}

/// Language model turning a travel request into a JSON-shaped answer.
#[async_trait]
pub trait StructuringModel: Send + Sync {
    /// Returns the model's raw answer text. No accuracy contract, only the
    /// obligation to attempt the requested shape.
    async fn structure(&self, request: &StructuringRequest) -> Result<String, ModelError>;
}
