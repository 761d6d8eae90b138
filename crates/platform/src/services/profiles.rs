//! Cached profile lookups.
//!
//! The role router hits the profile on every dashboard entry; a short-lived
//! moka cache keeps that from becoming one query per navigation. Role
//! changes (via the CLI) show up within the TTL.

use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;

use bookpress_core::UserId;

use crate::db::ProfileRepository;
use crate::models::Profile;

/// How long a cached profile stays fresh.
const PROFILE_TTL: Duration = Duration::from_secs(60);

/// Maximum number of cached profiles.
const PROFILE_CACHE_CAPACITY: u64 = 10_000;

/// Cache over [`ProfileRepository::get`].
#[derive(Clone)]
pub struct ProfileCache {
    pool: PgPool,
    cache: Cache<UserId, Option<Profile>>,
}

impl ProfileCache {
    /// Create a cache over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(PROFILE_CACHE_CAPACITY)
            .time_to_live(PROFILE_TTL)
            .build();
        Self { pool, cache }
    }

    /// Get a user's profile, hitting the database at most once per TTL.
    ///
    /// A lookup failure is logged and treated as "no profile"; the caller
    /// falls back to reader behavior rather than failing the request.
    pub async fn get(&self, user_id: UserId) -> Option<Profile> {
        let pool = self.pool.clone();
        self.cache
            .get_with(user_id, async move {
                match ProfileRepository::new(&pool).get(user_id).await {
                    Ok(profile) => profile,
                    Err(e) => {
                        tracing::warn!(%user_id, "profile lookup failed: {e}");
                        None
                    }
                }
            })
            .await
    }

    /// Seed an entry directly, bypassing the database.
    #[cfg(test)]
    pub(crate) async fn prime(&self, profile: Profile) {
        self.cache.insert(profile.user_id, Some(profile)).await;
    }
}
