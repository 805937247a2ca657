//! The resilient search orchestrator: date-shift retry, result
//! selection and truncation, and `Offer` materialization.

pub mod orchestrator;

pub use orchestrator::{SearchOrchestrator, SearchOutcome};
