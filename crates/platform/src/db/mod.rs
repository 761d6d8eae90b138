//! Database operations for the platform `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Site authentication (email + argon2 password hash)
//! - `profiles` - Role and display metadata, 1:1 with `users`
//! - `books` - Published catalog entries targeted by semantic search
//! - `carts` - One JSONB cart blob per owner key
//! - `sessions` - Tower-sessions storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/platform/migrations/` and run via:
//! ```bash
//! cargo run -p bookpress-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod books;
pub mod carts;
pub mod profiles;
pub mod users;

pub use books::BookRepository;
pub use carts::PostgresCartPersistence;
pub use profiles::ProfileRepository;
pub use users::UserRepository;

/// Errors returned by repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The underlying query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row held data that no longer parses as a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
