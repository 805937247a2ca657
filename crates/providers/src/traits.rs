use chrono::NaiveDate;

use tb_domain::entity::{CatalogEntry, CatalogKind, SearchType};
use tb_domain::error::Result;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Request / Response types
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A provider-agnostic tour search request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub search_type: SearchType,
    /// Departure city id.
    pub place_from: i64,
    /// Destination id (`ByPlace`) or hotel id (`ByHotel`).
    pub dest_or_hotel: i64,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    /// Party size.
    pub adults: u32,
}

impl SearchRequest {
    /// Trip length the provider expects instead of an end date.
    pub fn duration_days(&self) -> i64 {
        (self.date_to - self.date_from).num_days()
    }
}

/// Business status of a search response.
///
/// `NotFound` is a normal outcome (the date-shift retry trigger), not
/// an error; `Error` is a non-retryable provider-side failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Ok,
    NotFound,
    Error(String),
}

/// One raw offer from a search response, before shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferCandidate {
    pub id: i64,
    /// Hotel the offer books into (display name resolved separately).
    pub hotel_id: i64,
    /// Geographic grouping key for per-location minimum-price selection.
    pub location_id: i64,
    pub price: f64,
    pub date_from: NaiveDate,
    pub duration_days: i64,
    /// Provider-relative booking path, possibly empty.
    pub booking_ref: String,
}

/// A search response: the business status plus raw candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub status: SearchStatus,
    pub offers: Vec<OfferCandidate>,
}

impl SearchResponse {
    /// True when the date-shift fallback should fire: an explicit
    /// not-found status or a successful-but-empty candidate list.
    pub fn is_empty_result(&self) -> bool {
        self.status == SearchStatus::NotFound
            || (self.status == SearchStatus::Ok && self.offers.is_empty())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Core provider trait
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Capability every travel-provider adapter must implement.
///
/// Implementations translate between these types and the wire format of
/// one provider's HTTP API.  Consumers (resolver, orchestrator) only
/// see this trait, so tests substitute fakes.
#[async_trait::async_trait]
pub trait TravelProvider: Send + Sync {
    /// Fetch a reference catalog.  Always fresh, no caching layer.
    async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>>;

    /// Run one search call with the request's dates as given.
    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse>;

    /// Build the booking URL for a candidate.  Pure: no network, same
    /// output for the same request snapshot and candidate.
    fn booking_url(&self, req: &SearchRequest, candidate: &OfferCandidate) -> String;

    /// A unique identifier for this provider instance.
    fn provider_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn duration_is_whole_days() {
        let req = SearchRequest {
            search_type: SearchType::ByPlace,
            place_from: 1,
            dest_or_hotel: 2,
            date_from: date(2024, 6, 10),
            date_to: date(2024, 6, 15),
            adults: 1,
        };
        assert_eq!(req.duration_days(), 5);
    }

    #[test]
    fn empty_result_detection() {
        let not_found = SearchResponse {
            status: SearchStatus::NotFound,
            offers: vec![],
        };
        assert!(not_found.is_empty_result());

        let ok_empty = SearchResponse {
            status: SearchStatus::Ok,
            offers: vec![],
        };
        assert!(ok_empty.is_empty_result());

        let err = SearchResponse {
            status: SearchStatus::Error("rate limited".into()),
            offers: vec![],
        };
        assert!(!err.is_empty_result());
    }
}
