//! Shared domain types for the tourbot workspace: the error type,
//! configuration, catalog/offer entities, and date format helpers.

pub mod config;
pub mod dates;
pub mod entity;
pub mod error;
