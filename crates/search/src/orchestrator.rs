//! Search with date-shift fallback.
//!
//! The provider reporting "no offers for these dates" is a normal
//! outcome, handled by moving both dates back one day and retrying
//! within a fixed attempt budget.  Anything else the provider reports
//! is a hard error and propagates immediately.

use std::collections::HashMap;
use std::sync::Arc;

use tb_domain::config::SearchConfig;
use tb_domain::entity::{CatalogKind, Offer, SearchType};
use tb_domain::error::{Error, Result};
use tb_providers::{OfferCandidate, SearchRequest, SearchResponse, SearchStatus, TravelProvider};
use tb_sessions::Session;

/// The business outcome of an orchestrated search.
///
/// `NotFound` is the attempt budget running out without offers; it
/// drives the session to its failure state but is not an error.  Hard
/// failures (transport, malformed payloads, provider-side errors) ride
/// the `Err` arm instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(Vec<Offer>),
    NotFound,
}

/// Runs searches for completed sessions against an injected provider.
pub struct SearchOrchestrator {
    provider: Arc<dyn TravelProvider>,
    config: SearchConfig,
    adults: u32,
}

impl SearchOrchestrator {
    pub fn new(provider: Arc<dyn TravelProvider>, config: SearchConfig, adults: u32) -> Self {
        Self {
            provider,
            config,
            adults,
        }
    }

    /// Search for the session's populated fields, shifting dates back a
    /// day on each empty result until the attempt budget is spent.
    pub async fn search(&self, session: &Session) -> Result<SearchOutcome> {
        let mut req = self.build_request(session)?;

        for attempt in 1..=self.config.date_shift_attempts {
            let resp = self.provider.search(&req).await?;

            if let SearchStatus::Error(ref message) = resp.status {
                return Err(Error::Provider {
                    provider: self.provider.provider_id().to_string(),
                    message: message.clone(),
                });
            }

            if resp.is_empty_result() {
                tracing::info!(
                    attempt,
                    date_from = %req.date_from,
                    "no offers, shifting dates back one day"
                );
                req.date_from -= chrono::Duration::days(1);
                req.date_to -= chrono::Duration::days(1);
                continue;
            }

            let offers = self.shape(&req, resp).await?;
            return Ok(SearchOutcome::Found(offers));
        }

        tracing::info!(
            attempts = self.config.date_shift_attempts,
            "attempt budget exhausted without offers"
        );
        Ok(SearchOutcome::NotFound)
    }

    /// Assemble the provider request from a completed session.  A
    /// missing mandatory field means the wizard was not finished and
    /// the user must restart from that step.
    fn build_request(&self, session: &Session) -> Result<SearchRequest> {
        let search_type = session
            .search_type
            .ok_or_else(|| missing("search_type"))?;
        Ok(SearchRequest {
            search_type,
            place_from: session.place_from.ok_or_else(|| missing("place_from"))?,
            dest_or_hotel: session
                .dest_or_hotel()
                .ok_or_else(|| missing("destination"))?,
            date_from: session.date_from.ok_or_else(|| missing("date_from"))?,
            date_to: session.date_to.ok_or_else(|| missing("date_to"))?,
            adults: self.adults,
        })
    }

    /// Select, truncate and materialize offers from a non-empty
    /// response.
    ///
    /// By-place searches keep only the cheapest offer per location
    /// (first minimum on ties); by-hotel searches keep everything.  The
    /// survivors are truncated to `max_results` and enriched with the
    /// hotel display name from the Hotels catalog.
    async fn shape(&self, req: &SearchRequest, resp: SearchResponse) -> Result<Vec<Offer>> {
        let mut kept: Vec<OfferCandidate> = match req.search_type {
            SearchType::ByPlace => cheapest_per_location(resp.offers),
            SearchType::ByHotel => resp.offers,
        };
        kept.truncate(self.config.max_results);

        let hotel_names = self.hotel_names().await?;

        Ok(kept
            .into_iter()
            .map(|candidate| {
                let name = hotel_names
                    .get(&candidate.hotel_id)
                    .cloned()
                    .unwrap_or_else(|| format!("hotel #{}", candidate.hotel_id));
                Offer {
                    name,
                    id: candidate.id,
                    price: candidate.price,
                    booking_url: self.provider.booking_url(req, &candidate),
                    date_from: candidate.date_from,
                    duration_days: candidate.duration_days,
                }
            })
            .collect())
    }

    async fn hotel_names(&self) -> Result<HashMap<i64, String>> {
        let hotels = self.provider.list(CatalogKind::Hotels).await?;
        Ok(hotels.into_iter().map(|h| (h.id, h.name)).collect())
    }
}

/// Keep the first minimum-price candidate per location, preserving the
/// provider's location order.
fn cheapest_per_location(offers: Vec<OfferCandidate>) -> Vec<OfferCandidate> {
    let mut kept: Vec<OfferCandidate> = Vec::new();
    let mut index_by_location: HashMap<i64, usize> = HashMap::new();

    for offer in offers {
        match index_by_location.get(&offer.location_id) {
            Some(&i) => {
                // Strict comparison keeps the first minimum on ties.
                if offer.price < kept[i].price {
                    kept[i] = offer;
                }
            }
            None => {
                index_by_location.insert(offer.location_id, kept.len());
                kept.push(offer);
            }
        }
    }

    kept
}

fn missing(field: &str) -> Error {
    Error::Other(format!("session is missing {field}"))
}
