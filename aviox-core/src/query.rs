use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Three-letter IATA location code, always upper-case ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationCode(String);

impl LocationCode {
    /// Trims and upper-cases `raw`, then checks the three-letter shape.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Some(Self(code))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LocationCode {
    type Error = QueryViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        LocationCode::parse(&value).ok_or(QueryViolation::InvalidLocation {
            field: "location",
            value,
        })
    }
}

impl From<LocationCode> for String {
    fn from(code: LocationCode) -> Self {
        code.0
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a structured answer was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryViolation {
    #[error("no JSON object found in the answer")]
    NoPayload,
    #[error("answer is not a valid query object: {0}")]
    InvalidPayload(String),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("`{field}` is not a three-letter location code: {value:?}")]
    InvalidLocation { field: &'static str, value: String },
    #[error("`date` is not a YYYY-MM-DD calendar date: {0:?}")]
    InvalidDate(String),
    #[error("origin and destination are both {0}")]
    SameEndpoints(LocationCode),
}

/// A validated one-way search: where from, where to, and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredQuery {
    origin: LocationCode,
    destination: LocationCode,
    date: NaiveDate,
}

impl StructuredQuery {
    pub fn new(
        origin: LocationCode,
        destination: LocationCode,
        date: NaiveDate,
    ) -> Result<Self, QueryViolation> {
        if origin == destination {
            return Err(QueryViolation::SameEndpoints(origin));
        }
        Ok(Self { origin, destination, date })
    }

    pub fn origin(&self) -> &LocationCode {
        &self.origin
    }

    pub fn destination(&self) -> &LocationCode {
        &self.destination
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Label shown next to saved flights, e.g. `LHR → JFK`.
    pub fn route_label(&self) -> String {
        format!("{} → {}", self.origin, self.destination)
    }
}
