use std::sync::Arc;

use tb_domain::entity::{CatalogEntry, CatalogKind};
use tb_domain::error::Result;
use tb_providers::TravelProvider;

/// Rank catalog entries against a free-text query.
///
/// An entry matches when the lower-cased query is a substring of the
/// lower-cased entry name.  No scoring: matches keep the catalog's own
/// order, so "first match" means "first in provider order".
pub fn resolve(query: &str, entries: &[CatalogEntry]) -> Vec<CatalogEntry> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    entries
        .iter()
        .filter(|e| e.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Resolver over a live provider catalog.
///
/// The catalog is re-fetched on every call.  That keeps results fresh
/// at the cost of a full listing per lookup; changing this to a cache
/// would change staleness semantics, so it stays as is.
pub struct CatalogResolver {
    provider: Arc<dyn TravelProvider>,
}

impl CatalogResolver {
    pub fn new(provider: Arc<dyn TravelProvider>) -> Self {
        Self { provider }
    }

    /// Fetch `kind` and rank its entries against `query`.  Fetch
    /// failures propagate; an `Ok` empty vec means "no match".
    pub async fn resolve(&self, query: &str, kind: CatalogKind) -> Result<Vec<CatalogEntry>> {
        let entries = self.provider.list(kind).await?;
        let matches = resolve(query, &entries);
        tracing::debug!(
            query,
            ?kind,
            catalog_size = entries.len(),
            matches = matches.len(),
            "catalog resolution"
        );
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_domain::error::Error;
    use tb_providers::{OfferCandidate, SearchRequest, SearchResponse};

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("Paris", 1),
            CatalogEntry::new("Sparta", 2),
            CatalogEntry::new("Lisbon", 3),
        ]
    }

    #[test]
    fn substring_matches_are_case_insensitive() {
        let matches = resolve("par", &catalog());
        assert_eq!(
            matches,
            vec![CatalogEntry::new("Paris", 1), CatalogEntry::new("Sparta", 2)]
        );
    }

    #[test]
    fn no_match_is_empty() {
        assert!(resolve("xyz", &catalog()).is_empty());
    }

    #[test]
    fn blank_query_matches_nothing() {
        assert!(resolve("   ", &catalog()).is_empty());
    }

    #[test]
    fn order_follows_catalog_not_relevance() {
        // "Sparta" contains the query later in the name than "Paris"
        // does, but order is still catalog order.
        let entries = vec![CatalogEntry::new("Sparta", 2), CatalogEntry::new("Paris", 1)];
        let matches = resolve("PAR", &entries);
        assert_eq!(matches[0].id, 2);
        assert_eq!(matches[1].id, 1);
    }

    // ── Provider-backed resolver ───────────────────────────────────

    struct StaticProvider {
        entries: Vec<CatalogEntry>,
    }

    #[async_trait::async_trait]
    impl TravelProvider for StaticProvider {
        async fn list(&self, _kind: CatalogKind) -> Result<Vec<CatalogEntry>> {
            Ok(self.entries.clone())
        }

        async fn search(&self, _req: &SearchRequest) -> Result<SearchResponse> {
            Err(Error::Other("not used".into()))
        }

        fn booking_url(&self, _req: &SearchRequest, _c: &OfferCandidate) -> String {
            String::new()
        }

        fn provider_id(&self) -> &str {
            "static"
        }
    }

    #[tokio::test]
    async fn resolver_fetches_fresh_catalog() {
        let resolver = CatalogResolver::new(Arc::new(StaticProvider { entries: catalog() }));
        let matches = resolver.resolve("lis", CatalogKind::Destinations).await.unwrap();
        assert_eq!(matches, vec![CatalogEntry::new("Lisbon", 3)]);
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl TravelProvider for FailingProvider {
        async fn list(&self, _kind: CatalogKind) -> Result<Vec<CatalogEntry>> {
            Err(Error::Http("boom".into()))
        }

        async fn search(&self, _req: &SearchRequest) -> Result<SearchResponse> {
            Err(Error::Other("not used".into()))
        }

        fn booking_url(&self, _req: &SearchRequest, _c: &OfferCandidate) -> String {
            String::new()
        }

        fn provider_id(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn fetch_failure_propagates() {
        let resolver = CatalogResolver::new(Arc::new(FailingProvider));
        let err = resolver
            .resolve("par", CatalogKind::Destinations)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
