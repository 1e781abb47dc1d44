pub mod query;
pub mod structuring;
pub mod normalizer;
pub mod inventory;

pub use inventory::{decode_offers, InventoryError, InventoryLookup, InventoryRequest, RawOffer};
pub use normalizer::QueryNormalizer;
pub use query::{LocationCode, QueryViolation, StructuredQuery};
pub use structuring::{ModelError, StructuringModel, StructuringRequest};

/// Failure kinds of a single search. Each stage stops the pipeline; nothing
/// is retried here.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Search text is empty")]
    EmptyQuery,
    #[error("Could not understand the request: {reason}")]
    MalformedQuery { reason: QueryViolation, raw: String },
    #[error("Query normalization failed: {0}")]
    NormalizationFailed(#[source] ModelError),
    #[error("{0}")]
    InventoryUnavailable(#[from] InventoryError),
}

impl SearchError {
    /// The collaborator itself failed, so repeating the whole search may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SearchError::NormalizationFailed(_))
    }
}

pub type SearchResult<T> = Result<T, SearchError>;
