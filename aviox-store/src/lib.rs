pub mod app_config;
pub mod shortlist;
pub mod llm;
pub mod amadeus;

pub use amadeus::AmadeusClient;
pub use llm::OpenAiClient;
pub use shortlist::{Shortlist, ShortlistEntry};
