use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ordering applied to the result list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Cheapest,
    HighestPrice,
    Fastest,
}

/// Which itineraries survive by number of stops
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopFilter {
    #[default]
    All,
    DirectOnly,
}

impl StopFilter {
    pub fn admits(&self, stops: usize) -> bool {
        match self {
            StopFilter::All => true,
            StopFilter::DirectOnly => stops == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    pub sort_by: SortKey,
    pub stops: StopFilter,
}

/// One result row, ready for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresentableOffer {
    pub price: Decimal,
    pub currency: String,
    pub airline: String,
    /// Wall-clock `HH:MM` in the provider's local time
    pub departure_time: String,
    pub arrival_time: String,
    pub departure_code: String,
    pub arrival_code: String,
    /// Human form, e.g. `10h 30m`
    pub duration: String,
    /// Comparable magnitude; `None` when the provider token was unreadable
    pub duration_minutes: Option<u32>,
    pub stops: usize,
    pub is_cheapest: bool,
}

impl PresentableOffer {
    /// Badge text for the stop count.
    pub fn stop_label(&self) -> String {
        match self.stops {
            0 => "Direct Flight".to_string(),
            1 => "1 Stop".to_string(),
            n => format!("{} Stops", n),
        }
    }

    pub fn route_label(&self) -> String {
        format!("{} → {}", self.departure_code, self.arrival_code)
    }
}
