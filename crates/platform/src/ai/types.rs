//! Request and response types for the AI service.
//!
//! Ranked results are forwarded verbatim; the service owns their shape and
//! this side only echoes them to the caller.

use serde::{Deserialize, Serialize};

/// Fixed similarity model label reported alongside search results.
pub const MODEL_NAME: &str = "paraphrase-multilingual-MiniLM-L12-v2";

/// Fixed search method label reported alongside search results.
pub const SEARCH_METHOD: &str = "semantic_similarity";

/// A normalized semantic search request, ready to forward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchParams {
    /// Trimmed, non-empty query text.
    pub query: String,
    /// Optional category filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Maximum number of results; already capped.
    pub limit: u32,
    /// Similarity cutoff, passed through unchanged.
    pub threshold: f32,
}

/// Ranked results as returned by the service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    /// Ranked result objects, best match first.
    #[serde(default)]
    pub results: Vec<serde_json::Value>,
}

/// Outcome of an embedding backfill run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillSummary {
    /// Human-readable summary from the service.
    #[serde(default)]
    pub message: String,
    /// Per-book processing results, forwarded verbatim.
    #[serde(default)]
    pub results: serde_json::Value,
}
