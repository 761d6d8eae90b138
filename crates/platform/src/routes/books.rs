//! Catalog route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::BookRepository;
use crate::error::Result;
use crate::models::BookSummary;
use crate::state::AppState;

/// Default number of catalog entries returned.
const DEFAULT_PAGE_SIZE: i64 = 50;

/// Catalog listing query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    /// Optional category filter.
    pub category: Option<String>,
}

/// General catalog listing; the default landing area for readers.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<Json<Vec<BookSummary>>> {
    let books = BookRepository::new(state.pool())
        .list(query.category.as_deref(), DEFAULT_PAGE_SIZE)
        .await?;
    Ok(Json(books))
}
