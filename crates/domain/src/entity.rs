//! Catalog and offer entities shared between the resolver, the provider
//! adapters, and the search orchestrator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Catalogs
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One entry of a provider-supplied reference catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub id: i64,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>, id: i64) -> Self {
        Self { name: name.into(), id }
    }
}

/// The reference catalogs the provider serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    /// Cities a trip can start from.
    DepartureCities,
    /// Cities/regions a trip can go to.
    Destinations,
    /// Bookable hotels.
    Hotels,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Search mode
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What the user is searching for. Set once per session at the first
/// wizard step and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    ByPlace,
    ByHotel,
}

impl SearchType {
    /// Stable string form used by the session store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ByPlace => "by_place",
            Self::ByHotel => "by_hotel",
        }
    }

    /// Inverse of [`as_str`](Self::as_str). `None` for unknown input.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "by_place" => Some(Self::ByPlace),
            "by_hotel" => Some(Self::ByHotel),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Offers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A priced, dated, bookable search result built from provider data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// Destination or hotel display name.
    pub name: String,
    pub id: i64,
    pub price: f64,
    pub booking_url: String,
    pub date_from: NaiveDate,
    pub duration_days: i64,
}
