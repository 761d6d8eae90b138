//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::ai::{AiClient, AiError};
use crate::auth::events::{AuthEvent, AuthEvents};
use crate::cart::{CartStore, Synchronizer};
use crate::config::PlatformConfig;
use crate::db::PostgresCartPersistence;
use crate::services::ProfileCache;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Owns the explicit cart store and auth event
/// channel; components receive them through this state rather than through
/// ambient globals.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: PlatformConfig,
    pool: PgPool,
    ai: AiClient,
    carts: CartStore,
    auth_events: AuthEvents,
    profiles: ProfileCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Spawns the cart worker over Postgres persistence. The auth listener
    /// is wired separately via [`Self::init_cart_sync`] so the returned
    /// synchronizer can be kept alive by `main`.
    ///
    /// # Errors
    ///
    /// Returns an error if the AI client cannot be constructed.
    pub fn new(config: PlatformConfig, pool: PgPool) -> Result<Self, AiError> {
        let ai = AiClient::new(&config.ai)?;
        let carts = CartStore::spawn(PostgresCartPersistence::new(pool.clone()));
        let auth_events = AuthEvents::new();
        let profiles = ProfileCache::new(pool.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                ai,
                carts,
                auth_events,
                profiles,
            }),
        })
    }

    /// Register the cart-auth synchronizer. Must be called exactly once at
    /// startup; the returned handle must live as long as the server.
    #[must_use]
    pub fn init_cart_sync(&self) -> Option<Synchronizer> {
        self.inner.carts.init_auth_listener()
    }

    /// Apply an identity transition.
    ///
    /// The cart store has the transition on its own queue by the time this
    /// returns, so a cart mutation the client issues after the response
    /// cannot overtake the reset. Broadcast observers are notified after
    /// the enqueue.
    pub async fn publish_auth_event(&self, event: AuthEvent) {
        self.inner.carts.apply_auth_event(event.clone()).await;
        self.inner.auth_events.publish(event);
    }

    /// Get a reference to the platform configuration.
    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the AI service client.
    #[must_use]
    pub fn ai(&self) -> &AiClient {
        &self.inner.ai
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn carts(&self) -> &CartStore {
        &self.inner.carts
    }

    /// Get a reference to the profile cache.
    #[must_use]
    pub fn profiles(&self) -> &ProfileCache {
        &self.inner.profiles
    }
}
