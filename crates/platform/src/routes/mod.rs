//! HTTP route handlers for the platform.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Catalog
//! GET  /books                  - Book listing (optional ?category=)
//!
//! # Cart (session-scoped)
//! GET  /cart                   - Current cart snapshot
//! POST /cart/add               - Add an item (quantities merge)
//! POST /cart/update            - Set a line quantity (0 removes)
//! POST /cart/remove            - Remove a line
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Total item count
//!
//! # Auth
//! POST /auth/register          - Create account and sign in
//! POST /auth/login             - Sign in
//! POST /auth/logout            - Sign out
//! GET  /auth/me                - Current user
//!
//! # Dashboard (role-routed)
//! GET  /dashboard              - Redirect to the caller's area
//! GET  /dashboard/author       - Author workspace
//! GET  /dashboard/editor       - Editor workspace
//! GET  /dashboard/publisher    - Publisher workspace
//!
//! # AI proxy
//! POST /api/ai/search              - Semantic search
//! GET  /api/ai/search              - Endpoint docs
//! POST /api/ai/generate-embeddings - Embedding backfill (staff only)
//! GET  /api/ai/generate-embeddings - Endpoint docs
//! ```

pub mod api;
pub mod auth;
pub mod books;
pub mod cart;
pub mod dashboard;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
///
/// Credential endpoints carry a tighter rate limit than the rest of the site.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .layer(auth_rate_limiter())
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::entry))
        .route("/author", get(dashboard::author_area))
        .route("/editor", get(dashboard::editor_area))
        .route("/publisher", get(dashboard::publisher_area))
}

/// Create the AI API routes router.
pub fn ai_api_routes() -> Router<AppState> {
    Router::new()
        .route("/search", get(api::ai::search_docs).post(api::ai::search))
        .route(
            "/generate-embeddings",
            get(api::ai::generate_embeddings_docs).post(api::ai::generate_embeddings),
        )
        .layer(api_rate_limiter())
}

/// Create all routes for the platform.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/books", get(books::index))
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/api/ai", ai_api_routes())
}
