use aviox_offer::PresentableOffer;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A flight the user saved during the session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortlistEntry {
    pub id: Uuid,
    pub airline: String,
    pub price: Decimal,
    pub currency: String,
    /// e.g. `LHR → JFK`
    pub route: String,
    pub added_at: DateTime<Utc>,
}

impl ShortlistEntry {
    pub fn from_offer(offer: &PresentableOffer) -> Self {
        Self {
            id: Uuid::new_v4(),
            airline: offer.airline.clone(),
            price: offer.price,
            currency: offer.currency.clone(),
            route: offer.route_label(),
            added_at: Utc::now(),
        }
    }
}

/// Append-only list of saved flights; entries are only ever removed all at once.
#[derive(Debug, Default)]
pub struct Shortlist {
    entries: Vec<ShortlistEntry>,
}

impl Shortlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ShortlistEntry) {
        self.entries.push(entry);
    }

    /// Empties the list, returning how many entries were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        self.entries.clear();
        removed
    }

    pub fn entries(&self) -> &[ShortlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
