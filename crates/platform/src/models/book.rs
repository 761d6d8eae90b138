//! Catalog book types.

use serde::{Deserialize, Serialize};

use bookpress_core::BookId;

/// A catalog entry as shown in book listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
    /// Unique book ID.
    pub id: BookId,
    /// Book title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Category label (e.g., "fiction", "history").
    pub category: Option<String>,
    /// Price in the smallest currency unit.
    pub price_cents: i64,
    /// Whether an embedding has been generated for this book.
    pub has_embedding: bool,
}
