//! Book repository for catalog listings.

use sqlx::PgPool;
use uuid::Uuid;

use bookpress_core::BookId;

use super::RepositoryError;
use crate::models::BookSummary;

/// Raw `books` row.
#[derive(sqlx::FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author: String,
    category: Option<String>,
    price_cents: i64,
    has_embedding: bool,
}

impl From<BookRow> for BookSummary {
    fn from(r: BookRow) -> Self {
        Self {
            id: BookId::new(r.id),
            title: r.title,
            author: r.author,
            category: r.category,
            price_cents: r.price_cents,
            has_embedding: r.has_embedding,
        }
    }
}

/// Repository for catalog queries.
pub struct BookRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BookRepository<'a> {
    /// Create a new book repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List catalog entries, newest first, optionally filtered by category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<BookSummary>, RepositoryError> {
        let rows: Vec<BookRow> = match category {
            Some(category) => {
                sqlx::query_as(
                    "SELECT id, title, author, category, price_cents, has_embedding \
                     FROM books WHERE category = $1 \
                     ORDER BY created_at DESC LIMIT $2",
                )
                .bind(category)
                .bind(limit)
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT id, title, author, category, price_cents, has_embedding \
                     FROM books ORDER BY created_at DESC LIMIT $1",
                )
                .bind(limit)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(BookSummary::from).collect())
    }
}
