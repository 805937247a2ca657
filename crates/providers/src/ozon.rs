//! Ozon Travel adapter.
//!
//! Reference catalogs are static JSON dumps fetched with GET; searches
//! are POSTed to the tours API with a PascalCase body.  The adapter
//! owns the per-call timeout and the bounded transport retry; business
//! outcomes ("no offers") are reported through [`SearchStatus`], never
//! as errors.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use tb_domain::config::ProviderConfig;
use tb_domain::dates::{format_wire_date, parse_wire_date};
use tb_domain::entity::{CatalogEntry, CatalogKind, SearchType};
use tb_domain::error::{Error, Result};

use crate::traits::{
    OfferCandidate, SearchRequest, SearchResponse, SearchStatus, TravelProvider,
};
use crate::util::{from_reqwest, is_retryable, resolve_partner_id};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const PROVIDER_ID: &str = "ozon";

/// Public site root used for booking deep links.
const SITE_URL: &str = "https://www.ozon.travel";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Adapter struct
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A [`TravelProvider`] adapter for the Ozon Travel HTTP API.
pub struct OzonProvider {
    api_url: String,
    static_url: String,
    partner_id: String,
    transport_retries: u32,
    client: reqwest::Client,
}

impl OzonProvider {
    /// Create a new adapter from the provider config.
    pub fn from_config(cfg: &ProviderConfig) -> Result<Self> {
        let partner_id = resolve_partner_id(&cfg.partner_id_env);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(from_reqwest)?;

        Ok(Self {
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            static_url: cfg.static_url.trim_end_matches('/').to_string(),
            partner_id,
            transport_retries: cfg.transport_retries.max(1),
            client,
        })
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Send a request, retrying connect/timeout failures up to the
    /// transport budget.  A response we received but cannot use is a
    /// hard error and is not retried.
    async fn send_json(&self, req: reqwest::RequestBuilder) -> Result<Value> {
        let mut last_err: Option<Error> = None;

        for attempt in 1..=self.transport_retries {
            let attempt_req = req.try_clone().ok_or_else(|| {
                Error::Other("request body not cloneable for retry".into())
            })?;

            match attempt_req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        return Err(Error::Provider {
                            provider: PROVIDER_ID.into(),
                            message: format!("HTTP {status}"),
                        });
                    }
                    return resp.json::<Value>().await.map_err(|e| Error::Provider {
                        provider: PROVIDER_ID.into(),
                        message: format!("malformed payload: {e}"),
                    });
                }
                Err(e) if is_retryable(&e) && attempt < self.transport_retries => {
                    tracing::warn!(attempt, error = %e, "transport failure, retrying");
                    last_err = Some(from_reqwest(e));
                }
                Err(e) => return Err(from_reqwest(e)),
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Other("retry budget exhausted".into())))
    }

    fn catalog_url(&self, kind: CatalogKind) -> String {
        let file = match kind {
            CatalogKind::DepartureCities => "departures.json",
            CatalogKind::Destinations => "Destinations.json",
            CatalogKind::Hotels => "HotelList.json",
        };
        format!("{}/{file}", self.static_url)
    }

    fn search_url(&self, search_type: SearchType) -> String {
        let endpoint = match search_type {
            SearchType::ByPlace => "getOffersByGeoObject",
            SearchType::ByHotel => "getOffersByHotel",
        };
        format!("{}/{endpoint}", self.api_url)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire format
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build the search POST body.  Pure, so the wire shape is testable
/// without a network.
fn build_search_body(req: &SearchRequest, partner_id: &str) -> Value {
    let mut body = serde_json::json!({
        "DepartureCityId": req.place_from,
        "DateFrom": format_wire_date(req.date_from),
        "DaysDuration": req.duration_days(),
        "AdultCount": req.adults,
        "PartnerId": partner_id,
        "OnlyDynamicPackages": false,
        "MetaSearch": true,
    });

    let dest_key = match req.search_type {
        SearchType::ByPlace => "GeoObjectId",
        SearchType::ByHotel => "HotelId",
    };
    body[dest_key] = serde_json::json!(req.dest_or_hotel);

    body
}

#[derive(Debug, Deserialize)]
struct RawCatalogItem {
    #[serde(alias = "Name")]
    name: Option<String>,
    #[serde(alias = "Id")]
    id: Option<i64>,
}

/// Parse a catalog dump, skipping entries missing a name or id.
fn parse_catalog(value: Value) -> Result<Vec<CatalogEntry>> {
    let items: Vec<RawCatalogItem> =
        serde_json::from_value(value).map_err(|e| Error::Provider {
            provider: PROVIDER_ID.into(),
            message: format!("malformed catalog: {e}"),
        })?;

    let total = items.len();
    let entries: Vec<CatalogEntry> = items
        .into_iter()
        .filter_map(|item| Some(CatalogEntry { name: item.name?, id: item.id? }))
        .collect();

    if entries.len() < total {
        tracing::debug!(
            skipped = total - entries.len(),
            "catalog entries missing name or id"
        );
    }

    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    #[serde(alias = "Status")]
    status: Option<String>,
    #[serde(alias = "Offers", default)]
    offers: Vec<RawOffer>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    #[serde(alias = "Id")]
    id: Option<i64>,
    #[serde(alias = "HotelId")]
    hotel_id: Option<i64>,
    #[serde(alias = "GeoObjectId")]
    location_id: Option<i64>,
    #[serde(alias = "Price")]
    price: Option<f64>,
    #[serde(alias = "DateFrom")]
    date_from: Option<String>,
    #[serde(alias = "DaysDuration")]
    duration_days: Option<i64>,
    #[serde(alias = "OfferUrl", default)]
    booking_ref: String,
}

/// Interpret a raw search payload against the request it answered.
///
/// Missing per-offer fields fall back to the request (the provider
/// omits echoed fields on exact matches); offers without an id or a
/// price are dropped.
fn parse_search_response(value: Value, req: &SearchRequest) -> Result<SearchResponse> {
    let raw: RawSearchResponse =
        serde_json::from_value(value).map_err(|e| Error::Provider {
            provider: PROVIDER_ID.into(),
            message: format!("malformed search payload: {e}"),
        })?;

    let status = match raw.status.as_deref() {
        None | Some("Ok") | Some("Success") => SearchStatus::Ok,
        Some("NotFound") | Some("NoOffers") => SearchStatus::NotFound,
        Some(other) => SearchStatus::Error(other.to_string()),
    };

    let offers = raw
        .offers
        .into_iter()
        .filter_map(|o| {
            Some(OfferCandidate {
                id: o.id?,
                hotel_id: o.hotel_id.unwrap_or(match req.search_type {
                    SearchType::ByHotel => req.dest_or_hotel,
                    SearchType::ByPlace => 0,
                }),
                location_id: o.location_id.unwrap_or(req.dest_or_hotel),
                price: o.price?,
                date_from: o
                    .date_from
                    .as_deref()
                    .and_then(parse_wire_date)
                    .unwrap_or(req.date_from),
                duration_days: o.duration_days.unwrap_or_else(|| req.duration_days()),
                booking_ref: o.booking_ref,
            })
        })
        .collect();

    Ok(SearchResponse { status, offers })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Trait impl
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[async_trait::async_trait]
impl TravelProvider for OzonProvider {
    async fn list(&self, kind: CatalogKind) -> Result<Vec<CatalogEntry>> {
        let url = self.catalog_url(kind);
        tracing::debug!(%url, ?kind, "fetching catalog");
        let value = self.send_json(self.client.get(&url)).await?;
        parse_catalog(value)
    }

    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse> {
        let url = self.search_url(req.search_type);
        let body = build_search_body(req, &self.partner_id);
        tracing::debug!(%url, date_from = %req.date_from, "search call");
        let value = self.send_json(self.client.post(&url).json(&body)).await?;
        parse_search_response(value, req)
    }

    fn booking_url(&self, req: &SearchRequest, candidate: &OfferCandidate) -> String {
        let path = if candidate.booking_ref.is_empty() {
            format!("/tours/offer/{}", candidate.id)
        } else {
            candidate.booking_ref.clone()
        };
        format!(
            "{SITE_URL}{path}?DepartureCityId={}&DateFrom={}&DaysDuration={}&PartnerId={}",
            req.place_from,
            format_wire_date(req.date_from),
            req.duration_days(),
            self.partner_id,
        )
    }

    fn provider_id(&self) -> &str {
        PROVIDER_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn req(search_type: SearchType) -> SearchRequest {
        SearchRequest {
            search_type,
            place_from: 11,
            dest_or_hotel: 22,
            date_from: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            adults: 2,
        }
    }

    #[test]
    fn by_place_body_uses_geo_object_key() {
        let body = build_search_body(&req(SearchType::ByPlace), "p-1");
        assert_eq!(body["DepartureCityId"], 11);
        assert_eq!(body["GeoObjectId"], 22);
        assert!(body.get("HotelId").is_none());
        assert_eq!(body["DateFrom"], "2024-06-10");
        assert_eq!(body["DaysDuration"], 5);
        assert_eq!(body["AdultCount"], 2);
        assert_eq!(body["PartnerId"], "p-1");
        assert_eq!(body["OnlyDynamicPackages"], false);
        assert_eq!(body["MetaSearch"], true);
    }

    #[test]
    fn by_hotel_body_uses_hotel_key() {
        let body = build_search_body(&req(SearchType::ByHotel), "");
        assert_eq!(body["HotelId"], 22);
        assert!(body.get("GeoObjectId").is_none());
    }

    #[test]
    fn catalog_parses_and_skips_incomplete_entries() {
        let value = serde_json::json!([
            { "Name": "Paris", "Id": 1 },
            { "Name": "Sparta" },
            { "Id": 3 },
            { "name": "Lisbon", "id": 4 },
        ]);
        let entries = parse_catalog(value).unwrap();
        assert_eq!(
            entries,
            vec![CatalogEntry::new("Paris", 1), CatalogEntry::new("Lisbon", 4)]
        );
    }

    #[test]
    fn catalog_rejects_non_array() {
        assert!(parse_catalog(serde_json::json!({"oops": 1})).is_err());
    }

    #[test]
    fn search_response_ok_with_offers() {
        let value = serde_json::json!({
            "Status": "Ok",
            "Offers": [
                {
                    "Id": 100,
                    "HotelId": 7,
                    "GeoObjectId": 22,
                    "Price": 480.5,
                    "DateFrom": "2024-06-10",
                    "DaysDuration": 5,
                    "OfferUrl": "/offers/100"
                }
            ]
        });
        let resp = parse_search_response(value, &req(SearchType::ByPlace)).unwrap();
        assert_eq!(resp.status, SearchStatus::Ok);
        assert_eq!(resp.offers.len(), 1);
        let offer = &resp.offers[0];
        assert_eq!(offer.hotel_id, 7);
        assert_eq!(offer.price, 480.5);
        assert_eq!(offer.booking_ref, "/offers/100");
    }

    #[test]
    fn search_response_not_found_status() {
        let value = serde_json::json!({ "Status": "NotFound", "Offers": [] });
        let resp = parse_search_response(value, &req(SearchType::ByPlace)).unwrap();
        assert_eq!(resp.status, SearchStatus::NotFound);
        assert!(resp.is_empty_result());
    }

    #[test]
    fn search_response_unknown_status_is_error() {
        let value = serde_json::json!({ "Status": "Throttled" });
        let resp = parse_search_response(value, &req(SearchType::ByPlace)).unwrap();
        assert_eq!(resp.status, SearchStatus::Error("Throttled".into()));
        assert!(!resp.is_empty_result());
    }

    #[test]
    fn offer_fields_fall_back_to_request() {
        let value = serde_json::json!({
            "Offers": [ { "Id": 1, "Price": 100.0 } ]
        });
        let request = req(SearchType::ByHotel);
        let resp = parse_search_response(value, &request).unwrap();
        let offer = &resp.offers[0];
        assert_eq!(offer.hotel_id, request.dest_or_hotel);
        assert_eq!(offer.location_id, request.dest_or_hotel);
        assert_eq!(offer.date_from, request.date_from);
        assert_eq!(offer.duration_days, 5);
    }

    #[test]
    fn booking_url_is_deterministic() {
        let cfg = ProviderConfig::default();
        let provider = OzonProvider::from_config(&cfg).unwrap();
        let request = req(SearchType::ByPlace);
        let candidate = OfferCandidate {
            id: 100,
            hotel_id: 7,
            location_id: 22,
            price: 480.0,
            date_from: request.date_from,
            duration_days: 5,
            booking_ref: String::new(),
        };

        let a = provider.booking_url(&request, &candidate);
        let b = provider.booking_url(&request, &candidate);
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.ozon.travel/tours/offer/100?"));
        assert!(a.contains("DateFrom=2024-06-10"));
    }

    #[test]
    fn booking_url_prefers_booking_ref() {
        let cfg = ProviderConfig::default();
        let provider = OzonProvider::from_config(&cfg).unwrap();
        let request = req(SearchType::ByPlace);
        let candidate = OfferCandidate {
            id: 100,
            hotel_id: 7,
            location_id: 22,
            price: 480.0,
            date_from: request.date_from,
            duration_days: 5,
            booking_ref: "/offers/100".into(),
        };
        let url = provider.booking_url(&request, &candidate);
        assert!(url.starts_with("https://www.ozon.travel/offers/100?"));
    }
}
