use crate::query::{LocationCode, StructuredQuery};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

// ============================================================================
// Provider offer records (flight-offers search shape)
// ============================================================================
//
// Every field is optional here so a single bad record never fails the whole
// batch. Validation happens when an offer is turned into a display row.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOffer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub price: Option<RawPrice>,
    #[serde(default)]
    pub itineraries: Vec<RawItinerary>,
    #[serde(default)]
    pub validating_airline_codes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPrice {
    #[serde(default)]
    pub total: Option<RawAmount>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// Providers send totals as strings ("450.00"); hand-written payloads often
/// use plain numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl RawAmount {
    pub fn to_decimal(&self) -> Option<Decimal> {
        let text = match self {
            RawAmount::Number(n) => n.to_string(),
            RawAmount::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItinerary {
    /// ISO-8601 style duration, e.g. `PT10H30M`.
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub segments: Vec<RawSegment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    #[serde(default)]
    pub departure: Option<RawEndpoint>,
    #[serde(default)]
    pub arrival: Option<RawEndpoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEndpoint {
    #[serde(default)]
    pub iata_code: Option<String>,
    /// Provider-local timestamp, `YYYY-MM-DDTHH:MM:SS`.
    #[serde(default)]
    pub at: Option<String>,
}

/// Decodes provider records one at a time. A record that does not fit the
/// offer shape is dropped with a warning; the rest of the batch survives.
pub fn decode_offers(values: Vec<serde_json::Value>) -> Vec<RawOffer> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value::<RawOffer>(value) {
            Ok(offer) => Some(offer),
            Err(e) => {
                warn!(index, "Dropping undecodable offer: {}", e);
                None
            }
        })
        .collect()
}

// ============================================================================
// Lookup collaborator
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryRequest {
    pub origin: LocationCode,
    pub destination: LocationCode,
    pub date: NaiveDate,
    pub passenger_count: u32,
    pub max_results: u32,
}

impl InventoryRequest {
    pub fn for_query(query: &StructuredQuery, passenger_count: u32, max_results: u32) -> Self {
        Self {
            origin: query.origin().clone(),
            destination: query.destination().clone(),
            date: query.date(),
            passenger_count,
            max_results,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// Provider-reported problem; the detail is shown to the caller verbatim.
    #[error("{0}")]
    Provider(String),
    #[error("Inventory request failed: {0}")]
    Transport(String),
    #[error("Inventory authentication failed: {0}")]
    Authentication(String),
}

/// Flight inventory provider.
#[async_trait]
pub trait InventoryLookup: Send + Sync {
    async fn find_offers(&self, request: &InventoryRequest) -> Result<Vec<RawOffer>, InventoryError>;
}
