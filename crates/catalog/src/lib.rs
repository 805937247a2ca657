//! Reference-catalog resolution.
//!
//! Free-text user input is matched against a provider catalog by
//! case-insensitive substring containment, in catalog order.  Callers
//! take the first match; an empty result means "no match, re-prompt".

pub mod resolver;

pub use resolver::{resolve, CatalogResolver};
