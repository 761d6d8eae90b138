//! Postgres-backed cart persistence.
//!
//! One JSONB blob per owner key in the `carts` table. Only the cart worker
//! calls into this type, so there is never more than one writer per key.

use sqlx::PgPool;

use crate::cart::{Cart, CartPersistence, PersistError};

/// [`CartPersistence`] backed by the `carts` table.
#[derive(Debug, Clone)]
pub struct PostgresCartPersistence {
    pool: PgPool,
}

impl PostgresCartPersistence {
    /// Create a persistence backend over the given pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CartPersistence for PostgresCartPersistence {
    async fn load(&self, key: &str) -> Result<Option<Cart>, PersistError> {
        let row: Option<(serde_json::Value,)> =
            sqlx::query_as("SELECT items FROM carts WHERE owner_key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(items,)| serde_json::from_value(items))
            .transpose()
            .map_err(PersistError::from)
    }

    async fn save(&self, key: &str, cart: &Cart) -> Result<(), PersistError> {
        let items = serde_json::to_value(cart)?;
        sqlx::query(
            "INSERT INTO carts (owner_key, items) VALUES ($1, $2) \
             ON CONFLICT (owner_key) DO UPDATE \
             SET items = EXCLUDED.items, updated_at = now()",
        )
        .bind(key)
        .bind(items)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistError> {
        sqlx::query("DELETE FROM carts WHERE owner_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
