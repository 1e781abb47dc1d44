use crate::duration;
use crate::models::{DisplayConfig, PresentableOffer, SortKey};
use aviox_core::inventory::{RawEndpoint, RawOffer};
use chrono::{DateTime, NaiveDateTime};
use tracing::{debug, warn};

/// Why a provider record could not be shown
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("missing price")]
    MissingPrice,
    #[error("unreadable price total")]
    InvalidPrice,
    #[error("missing currency")]
    MissingCurrency,
    #[error("no itinerary")]
    MissingItinerary,
    #[error("itinerary has no segments")]
    EmptyItinerary,
    #[error("missing validating airline code")]
    MissingAirline,
    #[error("missing {0} location code")]
    MissingLocation(&'static str),
    #[error("unreadable {0} timestamp")]
    InvalidTimestamp(&'static str),
}

/// Ranks, filters and annotates provider offers for display.
///
/// Records that cannot be shown are skipped with a warning. `direct_only`
/// applies before sorting and before the cheapest flag is computed, so the
/// flag never refers to a hidden offer. Sorting is stable.
pub fn rerank(offers: &[RawOffer], config: &DisplayConfig) -> Vec<PresentableOffer> {
    let mut rows: Vec<PresentableOffer> = offers
        .iter()
        .enumerate()
        .filter_map(|(index, raw)| match present(raw) {
            Ok(row) => Some(row),
            Err(reason) => {
                warn!(
                    index,
                    offer_id = raw.id.as_deref().unwrap_or("-"),
                    "Skipping offer: {}",
                    reason
                );
                None
            }
        })
        .filter(|row| config.stops.admits(row.stops))
        .collect();

    match config.sort_by {
        SortKey::Cheapest => rows.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::HighestPrice => rows.sort_by(|a, b| b.price.cmp(&a.price)),
        // Unreadable durations go last.
        SortKey::Fastest => {
            rows.sort_by_key(|row| (row.duration_minutes.is_none(), row.duration_minutes))
        }
    }

    if let Some(min_price) = rows.iter().map(|row| row.price).min() {
        for row in rows.iter_mut() {
            row.is_cheapest = row.price == min_price;
        }
    }

    debug!("Presented {} of {} offers", rows.len(), offers.len());
    rows
}

/// Display row for the first itinerary of `raw`. The cheapest flag is left
/// unset; only [`rerank`] knows the whole set.
pub fn present(raw: &RawOffer) -> Result<PresentableOffer, SkipReason> {
    let price = raw.price.as_ref().ok_or(SkipReason::MissingPrice)?;
    let total = price.total.as_ref().ok_or(SkipReason::MissingPrice)?;
    let amount = total.to_decimal().ok_or(SkipReason::InvalidPrice)?;
    let currency = price
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or(SkipReason::MissingCurrency)?;

    let airline = raw
        .validating_airline_codes
        .first()
        .map(|code| code.trim())
        .filter(|code| !code.is_empty())
        .ok_or(SkipReason::MissingAirline)?;

    // Round trips carry more itineraries; only the outbound one is shown.
    let itinerary = raw.itineraries.first().ok_or(SkipReason::MissingItinerary)?;
    let (first, last) = match (itinerary.segments.first(), itinerary.segments.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(SkipReason::EmptyItinerary),
    };

    let (departure_code, departure_time) = endpoint(first.departure.as_ref(), "departure")?;
    let (arrival_code, arrival_time) = endpoint(last.arrival.as_ref(), "arrival")?;

    let token = itinerary.duration.as_deref().unwrap_or_default();

    Ok(PresentableOffer {
        price: amount,
        currency: currency.to_string(),
        airline: airline.to_string(),
        departure_time,
        arrival_time,
        departure_code,
        arrival_code,
        duration: duration::render(token),
        duration_minutes: duration::parse_minutes(token),
        stops: itinerary.segments.len() - 1,
        is_cheapest: false,
    })
}

fn endpoint(
    endpoint: Option<&RawEndpoint>,
    side: &'static str,
) -> Result<(String, String), SkipReason> {
    let endpoint = endpoint.ok_or(SkipReason::MissingLocation(side))?;
    let code = endpoint
        .iata_code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or(SkipReason::MissingLocation(side))?;
    let time = endpoint
        .at
        .as_deref()
        .and_then(wall_clock)
        .ok_or(SkipReason::InvalidTimestamp(side))?;
    Ok((code.to_uppercase(), time))
}

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// `HH:MM` exactly as the provider wrote it; no timezone conversion.
fn wall_clock(at: &str) -> Option<String> {
    let at = at.trim();
    let local = LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(at, format).ok())
        .or_else(|| DateTime::parse_from_rfc3339(at).ok().map(|dt| dt.naive_local()));
    match local {
        Some(local) => Some(local.format("%H:%M").to_string()),
        None => clock_after_separator(at),
    }
}

/// The five `HH:MM` characters after the date, when the shape allows it.
fn clock_after_separator(at: &str) -> Option<String> {
    let (_, time) = at.split_once(['T', ' '])?;
    let clock = time.get(..5)?;
    let bytes = clock.as_bytes();
    let shaped = bytes[2] == b':'
        && bytes[..2].iter().chain(&bytes[3..]).all(u8::is_ascii_digit);
    shaped.then(|| clock.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StopFilter;
    use rust_decimal::Decimal;
    use serde_json::json;

    const ROUTE: [&str; 4] = ["LHR", "DUB", "KEF", "JFK"];

    fn offer(airline: &str, price: serde_json::Value, segments: usize, duration: &str) -> RawOffer {
        let segments: Vec<_> = (0..segments)
            .map(|i| {
                json!({
                    "departure": { "iataCode": ROUTE[i], "at": format!("2026-10-20T{:02}:15:00", 8 + 2 * i) },
                    "arrival": { "iataCode": ROUTE[i + 1], "at": format!("2026-10-20T{:02}:45:00", 9 + 2 * i) },
                })
            })
            .collect();
        serde_json::from_value(json!({
            "price": { "total": price, "currency": "USD" },
            "itineraries": [{ "duration": duration, "segments": segments }],
            "validatingAirlineCodes": [airline],
        }))
        .unwrap()
    }

    fn scenario() -> Vec<RawOffer> {
        vec![
            offer("AA", json!(450), 2, "PT10H30M"),
            offer("BA", json!(450), 1, "PT9H"),
            offer("VS", json!(600), 1, "PT8H"),
        ]
    }

    fn config(sort_by: SortKey, stops: StopFilter) -> DisplayConfig {
        DisplayConfig { sort_by, stops }
    }

    fn airlines(rows: &[PresentableOffer]) -> Vec<&str> {
        rows.iter().map(|row| row.airline.as_str()).collect()
    }

    fn cheapest_flags(rows: &[PresentableOffer]) -> Vec<bool> {
        rows.iter().map(|row| row.is_cheapest).collect()
    }

    #[test]
    fn test_cheapest_all_stops_scenario() {
        let rows = rerank(&scenario(), &config(SortKey::Cheapest, StopFilter::All));

        assert_eq!(airlines(&rows), vec!["AA", "BA", "VS"]);
        assert_eq!(cheapest_flags(&rows), vec![true, true, false]);
        assert_eq!(rows[0].stops, 1);
        assert_eq!(rows[0].duration, "10h 30m");
        assert_eq!(rows[0].route_label(), "LHR → KEF");
    }

    #[test]
    fn test_cheapest_direct_only_scenario() {
        let rows = rerank(&scenario(), &config(SortKey::Cheapest, StopFilter::DirectOnly));

        assert_eq!(airlines(&rows), vec!["BA", "VS"]);
        assert_eq!(cheapest_flags(&rows), vec![true, false]);
    }

    #[test]
    fn test_filter_applies_before_cheapest_flag() {
        let offers = vec![
            offer("LX", json!("300.00"), 2, "PT12H"),
            offer("BA", json!("520.10"), 1, "PT8H"),
            offer("VS", json!("610.00"), 1, "PT8H"),
        ];
        let rows = rerank(&offers, &config(SortKey::HighestPrice, StopFilter::DirectOnly));

        assert!(rows.iter().all(|row| row.stops == 0));
        assert_eq!(airlines(&rows), vec!["VS", "BA"]);
        assert_eq!(cheapest_flags(&rows), vec![false, true]);
    }

    #[test]
    fn test_all_minimum_prices_are_flagged() {
        let offers = vec![
            offer("AA", json!("199.99"), 1, "PT7H"),
            offer("BA", json!(250), 1, "PT7H"),
            offer("VS", json!("199.990"), 1, "PT7H"),
        ];
        let rows = rerank(&offers, &config(SortKey::HighestPrice, StopFilter::All));

        assert_eq!(airlines(&rows), vec!["BA", "AA", "VS"]);
        assert_eq!(cheapest_flags(&rows), vec![false, true, true]);
    }

    #[test]
    fn test_price_comparison_is_numeric() {
        let offers = vec![offer("AA", json!("1000.00"), 1, "PT7H"), offer("BA", json!("999.50"), 1, "PT7H")];
        let rows = rerank(&offers, &config(SortKey::Cheapest, StopFilter::All));
        assert_eq!(airlines(&rows), vec!["BA", "AA"]);
        assert_eq!(rows[0].price, Decimal::new(99950, 2));
    }

    #[test]
    fn test_ties_keep_input_order_for_every_key() {
        let offers = vec![
            offer("A1", json!(300), 1, "PT5H"),
            offer("B1", json!(100), 1, "PT6H"),
            offer("A2", json!(300), 1, "PT5H"),
            offer("B2", json!(100), 1, "PT6H"),
            offer("A3", json!(300), 1, "PT5H"),
        ];

        let cheapest = rerank(&offers, &config(SortKey::Cheapest, StopFilter::All));
        assert_eq!(airlines(&cheapest), vec!["B1", "B2", "A1", "A2", "A3"]);

        let highest = rerank(&offers, &config(SortKey::HighestPrice, StopFilter::All));
        assert_eq!(airlines(&highest), vec!["A1", "A2", "A3", "B1", "B2"]);

        let fastest = rerank(&offers, &config(SortKey::Fastest, StopFilter::All));
        assert_eq!(airlines(&fastest), vec!["A1", "A2", "A3", "B1", "B2"]);
    }

    #[test]
    fn test_rerank_is_idempotent() {
        let offers = scenario();
        for sort_by in [SortKey::Cheapest, SortKey::HighestPrice, SortKey::Fastest] {
            for stops in [StopFilter::All, StopFilter::DirectOnly] {
                let config = config(sort_by, stops);
                assert_eq!(rerank(&offers, &config), rerank(&offers, &config));
            }
        }
    }

    #[test]
    fn test_fastest_puts_unreadable_durations_last() {
        let offers = vec![
            offer("XX", json!(100), 1, "about nine hours"),
            offer("AA", json!(450), 2, "PT10H30M"),
            offer("BA", json!(450), 1, "PT9H"),
            offer("YY", json!(100), 1, ""),
        ];
        let rows = rerank(&offers, &config(SortKey::Fastest, StopFilter::All));

        assert_eq!(airlines(&rows), vec!["BA", "AA", "XX", "YY"]);
        assert_eq!(rows[2].duration_minutes, None);
        assert_eq!(cheapest_flags(&rows), vec![false, false, true, true]);
    }

    #[test]
    fn test_malformed_record_is_skipped() {
        let mut offers: Vec<RawOffer> = (1..=5)
            .map(|i| offer(&format!("R{}", i), json!(100 * i), 1, "PT3H"))
            .collect();
        offers[2].price = None;

        let rows = rerank(&offers, &DisplayConfig::default());

        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| row.airline != "R3"));
    }

    #[test]
    fn test_skip_reasons() {
        let mut no_airline = offer("AA", json!(100), 1, "PT3H");
        no_airline.validating_airline_codes.clear();
        assert_eq!(present(&no_airline), Err(SkipReason::MissingAirline));

        let bad_price = offer("AA", json!("n/a"), 1, "PT3H");
        assert_eq!(present(&bad_price), Err(SkipReason::InvalidPrice));

        let mut no_itinerary = offer("AA", json!(100), 1, "PT3H");
        no_itinerary.itineraries.clear();
        assert_eq!(present(&no_itinerary), Err(SkipReason::MissingItinerary));

        let no_segments = offer("AA", json!(100), 0, "PT3H");
        assert_eq!(present(&no_segments), Err(SkipReason::EmptyItinerary));

        let mut bad_time = offer("AA", json!(100), 1, "PT3H");
        bad_time.itineraries[0].segments[0].arrival.as_mut().unwrap().at = Some("soon".into());
        assert_eq!(present(&bad_time), Err(SkipReason::InvalidTimestamp("arrival")));
    }

    #[test]
    fn test_times_are_shown_verbatim() {
        let mut raw = offer("BA", json!(450), 2, "PT10H30M");
        raw.itineraries[0].segments[1].arrival.as_mut().unwrap().at =
            Some("2026-10-20T23:05:00+05:30".into());

        let row = present(&raw).unwrap();
        assert_eq!(row.departure_time, "08:15");
        assert_eq!(row.arrival_time, "23:05");
        assert_eq!(row.departure_code, "LHR");
        assert_eq!(row.arrival_code, "KEF");
    }

    #[test]
    fn test_timestamp_variants_keep_the_offer() {
        let mut raw = offer("BA", json!(450), 1, "PT3H");
        raw.itineraries[0].segments[0].departure.as_mut().unwrap().at =
            Some("2026-10-20T08:15:00.000".into());
        raw.itineraries[0].segments[0].arrival.as_mut().unwrap().at =
            Some("2026-10-20 11:40:00".into());

        let row = present(&raw).unwrap();
        assert_eq!(row.departure_time, "08:15");
        assert_eq!(row.arrival_time, "11:40");
        assert_eq!(rerank(&[raw], &DisplayConfig::default()).len(), 1);
    }

    #[test]
    fn test_clock_taken_from_unusual_timestamp_shape() {
        assert_eq!(wall_clock("2026-10-20T08:15:00.123456789Z"), Some("08:15".to_string()));
        assert_eq!(wall_clock("2026-10-20T21:05 local"), Some("21:05".to_string()));
        assert_eq!(wall_clock("2026-10-20Tnoon"), None);
        assert_eq!(wall_clock("soon"), None);
    }

    #[test]
    fn test_out_of_order_segments_do_not_fail() {
        let mut raw = offer("BA", json!(450), 2, "PT10H30M");
        raw.itineraries[0].segments[1].arrival.as_mut().unwrap().at =
            Some("2026-10-19T01:00:00".into());

        let row = present(&raw).unwrap();
        assert_eq!(row.arrival_time, "01:00");
        assert_eq!(row.duration, "10h 30m");
    }

    #[test]
    fn test_round_trip_shows_outbound_only() {
        let mut raw = offer("BA", json!(900), 1, "PT8H");
        let mut inbound = raw.itineraries[0].clone();
        inbound.segments.push(inbound.segments[0].clone());
        raw.itineraries.push(inbound);

        let row = present(&raw).unwrap();
        assert_eq!(row.stops, 0);
        assert_eq!(row.arrival_code, "DUB");
    }

    #[test]
    fn test_empty_input() {
        assert!(rerank(&[], &DisplayConfig::default()).is_empty());
    }
}
