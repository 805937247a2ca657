//! Travel-provider adapters.
//!
//! `traits` defines the provider-agnostic capability the resolver and
//! the search orchestrator consume; `ozon` implements it against the
//! Ozon Travel HTTP API.

pub mod ozon;
pub mod traits;
pub mod util;

pub use ozon::OzonProvider;
pub use traits::{
    OfferCandidate, SearchRequest, SearchResponse, SearchStatus, TravelProvider,
};
