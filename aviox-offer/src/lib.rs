pub mod models;
pub mod duration;
pub mod processor;
pub mod search;

pub use models::{DisplayConfig, PresentableOffer, SortKey, StopFilter};
pub use processor::{present, rerank, SkipReason};
pub use search::{FlightSearch, LookupDefaults, SearchResults};
