use crate::models::{DisplayConfig, PresentableOffer};
use crate::processor::rerank;
use aviox_core::inventory::{InventoryLookup, InventoryRequest, RawOffer};
use aviox_core::normalizer::QueryNormalizer;
use aviox_core::query::StructuredQuery;
use aviox_core::structuring::StructuringModel;
use aviox_core::SearchResult;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

/// Passenger count and page size sent with every inventory lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupDefaults {
    pub passenger_count: u32,
    pub max_results: u32,
}

impl Default for LookupDefaults {
    fn default() -> Self {
        Self { passenger_count: 1, max_results: 15 }
    }
}

/// Outcome of one search. No offers is a valid outcome, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub query: StructuredQuery,
    /// Kept so sort or filter changes can be re-applied without a new lookup.
    pub raw_offers: Vec<RawOffer>,
    pub offers: Vec<PresentableOffer>,
}

impl SearchResults {
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    pub fn rerank(&self, config: &DisplayConfig) -> Vec<PresentableOffer> {
        rerank(&self.raw_offers, config)
    }
}

/// Text in, ranked offers out: normalize, look up, rerank.
#[derive(Clone)]
pub struct FlightSearch {
    normalizer: QueryNormalizer,
    inventory: Arc<dyn InventoryLookup>,
    defaults: LookupDefaults,
}

impl FlightSearch {
    pub fn new(
        model: Arc<dyn StructuringModel>,
        inventory: Arc<dyn InventoryLookup>,
        defaults: LookupDefaults,
    ) -> Self {
        Self {
            normalizer: QueryNormalizer::new(model),
            inventory,
            defaults,
        }
    }

    pub async fn search(&self, text: &str, reference_date: NaiveDate) -> SearchResult<SearchResults> {
        self.search_with(text, reference_date, &DisplayConfig::default()).await
    }

    pub async fn search_with(
        &self,
        text: &str,
        reference_date: NaiveDate,
        config: &DisplayConfig,
    ) -> SearchResult<SearchResults> {
        let query = self.normalizer.normalize(text, reference_date).await?;
        info!(
            "Searching {} on {}",
            query.route_label(),
            query.date().format("%Y-%m-%d")
        );

        let request = InventoryRequest::for_query(
            &query,
            self.defaults.passenger_count,
            self.defaults.max_results,
        );
        let raw_offers = self.inventory.find_offers(&request).await.map_err(|e| {
            error!("Inventory lookup failed for {}: {}", query.route_label(), e);
            e
        })?;

        let offers = rerank(&raw_offers, config);
        info!("{} offers received, {} presented", raw_offers.len(), offers.len());

        Ok(SearchResults { query, raw_offers, offers })
    }
}
