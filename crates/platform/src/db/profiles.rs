//! Profile repository for role lookups.

use sqlx::PgPool;

use bookpress_core::{Role, UserId};

use super::RepositoryError;
use crate::models::Profile;

/// Raw `profiles` row.
#[derive(sqlx::FromRow)]
struct ProfileRow {
    user_id: i64,
    role: String,
    display_name: Option<String>,
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the profile for a user, if one exists.
    ///
    /// Unknown role strings in the database fall back to [`Role::Reader`]
    /// rather than erroring; an unfamiliar role is not a failure condition.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, user_id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT user_id, role, display_name FROM profiles WHERE user_id = $1",
        )
        .bind(user_id.get())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|r| Profile {
            user_id: UserId::new(r.user_id),
            role: Role::parse_or_default(&r.role),
            display_name: r.display_name,
        }))
    }
}
