use aviox_offer::{DisplayConfig, FlightSearch};
use aviox_store::Shortlist;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct SearchSettings {
    /// Overrides "today" when set
    pub reference_date: Option<NaiveDate>,
    pub display: DisplayConfig,
}

impl SearchSettings {
    /// Request value first, then the configured override, then today (UTC).
    pub fn reference_date(&self, requested: Option<NaiveDate>) -> NaiveDate {
        requested
            .or(self.reference_date)
            .unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<FlightSearch>,
    pub shortlist: Arc<RwLock<Shortlist>>,
    pub settings: SearchSettings,
}

impl AppState {
    pub fn new(search: FlightSearch, settings: SearchSettings) -> Self {
        Self {
            search: Arc::new(search),
            shortlist: Arc::new(RwLock::new(Shortlist::new())),
            settings,
        }
    }
}
