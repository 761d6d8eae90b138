//! Client for the external embedding/semantic-search service.

pub mod client;
pub mod types;

pub use client::{AiClient, AiError};
pub use types::{BackfillSummary, SearchParams, SearchResults};
