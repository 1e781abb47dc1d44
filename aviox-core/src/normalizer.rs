use crate::query::{LocationCode, QueryViolation, StructuredQuery};
use crate::structuring::{StructuringModel, StructuringRequest};
use crate::{SearchError, SearchResult};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, error};

const OUTPUT_SHAPE: &str =
    r#"{"origin": "IATA_CODE", "destination": "IATA_CODE", "date": "YYYY-MM-DD"}"#;

// Longest first: "```json" must go before the bare fence.
const FENCE_MARKERS: [&str; 2] = ["```json", "```"];

/// Turns free-text travel intent into a validated [`StructuredQuery`].
#[derive(Clone)]
pub struct QueryNormalizer {
    model: Arc<dyn StructuringModel>,
}

impl QueryNormalizer {
    pub fn new(model: Arc<dyn StructuringModel>) -> Self {
        Self { model }
    }

    /// System prompt naming the exact answer shape and the reference date.
    pub fn instruction(reference_date: NaiveDate) -> String {
        format!(
            "Extract the flight search from the user's message.\n\
             Return only JSON: {OUTPUT_SHAPE}\n\
             Use IATA airport or city codes. Resolve relative dates against today.\n\
             Today is {}.",
            reference_date.format("%Y-%m-%d")
        )
    }

    pub async fn normalize(
        &self,
        text: &str,
        reference_date: NaiveDate,
    ) -> SearchResult<StructuredQuery> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let request = StructuringRequest {
            instruction: Self::instruction(reference_date),
            text: text.to_string(),
            reference_date,
        };

        let raw = self.model.structure(&request).await.map_err(|e| {
            error!("Structuring model failed: {}", e);
            SearchError::NormalizationFailed(e)
        })?;
        debug!("Structuring model answered: {}", raw);

        parse_structured_query(&raw).map_err(|reason| SearchError::MalformedQuery { reason, raw })
    }
}

#[derive(Debug, Deserialize)]
struct QueryFields {
    origin: Option<String>,
    destination: Option<String>,
    date: Option<String>,
}

/// Parses a model answer, tolerating fences and prose around the JSON object.
pub fn parse_structured_query(raw: &str) -> Result<StructuredQuery, QueryViolation> {
    let payload = extract_payload(raw).ok_or(QueryViolation::NoPayload)?;
    let fields: QueryFields = serde_json::from_value(Value::Object(payload))
        .map_err(|e| QueryViolation::InvalidPayload(e.to_string()))?;

    let origin = location(fields.origin, "origin")?;
    let destination = location(fields.destination, "destination")?;

    let date = fields.date.ok_or(QueryViolation::MissingField("date"))?;
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| QueryViolation::InvalidDate(date))?;

    StructuredQuery::new(origin, destination, date)
}

fn location(value: Option<String>, field: &'static str) -> Result<LocationCode, QueryViolation> {
    let value = value.ok_or(QueryViolation::MissingField(field))?;
    LocationCode::parse(&value).ok_or(QueryViolation::InvalidLocation { field, value })
}

/// First well-formed JSON object in `raw` after fence markers are removed.
pub fn extract_payload(raw: &str) -> Option<Map<String, Value>> {
    let mut cleaned = raw.to_string();
    for marker in FENCE_MARKERS {
        cleaned = cleaned.replace(marker, "");
    }
    let cleaned = cleaned.trim();

    cleaned.match_indices('{').find_map(|(start, _)| {
        let mut stream = serde_json::Deserializer::from_str(&cleaned[start..]).into_iter::<Value>();
        match stream.next() {
            Some(Ok(Value::Object(map))) => Some(map),
            _ => None,
        }
    })
}
