//! Role-based dashboard routing.
//!
//! `/dashboard` is the single entry point after sign-in: it reads the
//! authenticated profile and redirects to the role's area. The decision is
//! made fresh per request from session + profile, so it follows identity
//! changes without looping: an unauthenticated request gets exactly one
//! redirect to login, and a signed-in request exactly one redirect to its
//! area.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tracing::instrument;

use bookpress_core::Role;

use crate::middleware::{OptionalAuth, RequireAuth};
use crate::state::AppState;

/// Where each role lands after `/dashboard`. Unknown or absent roles go to
/// the general catalog.
#[must_use]
pub const fn destination_for(role: Role) -> &'static str {
    match role {
        Role::Author => "/dashboard/author",
        Role::Editor => "/dashboard/editor",
        Role::Publisher => "/dashboard/publisher",
        Role::Reader => "/books",
    }
}

/// Dashboard entry point: dispatch by role.
#[instrument(skip(state, auth))]
pub async fn entry(State(state): State<AppState>, auth: OptionalAuth) -> Response {
    let OptionalAuth(user) = auth;
    let Some(user) = user else {
        return Redirect::to("/auth/login").into_response();
    };

    // Lazy profile fetch; absent profile means plain reader.
    let role = state
        .profiles()
        .get(user.id)
        .await
        .map_or(Role::Reader, |profile| profile.role);

    Redirect::to(destination_for(role)).into_response()
}

/// Author workspace.
#[instrument(skip(state, auth))]
pub async fn author_area(State(state): State<AppState>, auth: RequireAuth) -> Response {
    role_area(state, auth, Role::Author).await
}

/// Editorial workspace.
#[instrument(skip(state, auth))]
pub async fn editor_area(State(state): State<AppState>, auth: RequireAuth) -> Response {
    role_area(state, auth, Role::Editor).await
}

/// Publishing workspace.
#[instrument(skip(state, auth))]
pub async fn publisher_area(State(state): State<AppState>, auth: RequireAuth) -> Response {
    role_area(state, auth, Role::Publisher).await
}

/// Render a role area, bouncing visitors with a different role back to the
/// dispatcher (which then sends them to their own area; no loop is
/// possible because the dispatcher never targets a mismatched area).
async fn role_area(state: AppState, RequireAuth(user): RequireAuth, required: Role) -> Response {
    let role = state
        .profiles()
        .get(user.id)
        .await
        .map_or(Role::Reader, |profile| profile.role);

    if role != required {
        return Redirect::to("/dashboard").into_response();
    }

    Json(json!({
        "area": required,
        "user": { "id": user.id, "email": user.email },
    }))
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::{MemoryStore, Session};

    use bookpress_core::{Email, UserId};

    use crate::config::{AiServiceConfig, PlatformConfig};
    use crate::models::{CurrentUser, Profile, session_keys};

    use super::*;

    /// State over a lazy pool; nothing here touches the database, profiles
    /// are seeded straight into the cache.
    fn test_state() -> AppState {
        let config = PlatformConfig {
            database_url: SecretString::from("postgres://localhost/bookpress"),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            base_url: "http://localhost:3000".to_owned(),
            session_secret: SecretString::from("0123456789abcdef0123456789abcdef"),
            ai: AiServiceConfig {
                base_url: "http://localhost:8000".to_owned(),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/bookpress")
            .unwrap();
        AppState::new(config, pool).unwrap()
    }

    /// A detached session carrying the given identity, injected the way
    /// the session layer would.
    async fn session_for(user: &CurrentUser) -> Session {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::CURRENT_USER, user)
            .await
            .unwrap();
        session
    }

    fn location(response: &axum::response::Response) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    #[test]
    fn test_role_destinations() {
        assert_eq!(destination_for(Role::Author), "/dashboard/author");
        assert_eq!(destination_for(Role::Editor), "/dashboard/editor");
        assert_eq!(destination_for(Role::Publisher), "/dashboard/publisher");
        assert_eq!(destination_for(Role::Reader), "/books");
    }

    #[tokio::test]
    async fn test_entry_without_identity_redirects_to_login() {
        let app = crate::routes::dashboard_routes().with_state(test_state());

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Exactly one redirect, straight to login.
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/auth/login");
    }

    #[tokio::test]
    async fn test_entry_sends_editor_to_editor_area_never_login() {
        let state = test_state();
        let user = CurrentUser {
            id: UserId::new(7),
            email: Email::parse("editor@example.com").unwrap(),
        };
        state
            .profiles()
            .prime(Profile {
                user_id: user.id,
                role: Role::Editor,
                display_name: None,
            })
            .await;

        let app = crate::routes::dashboard_routes().with_state(state);
        let request = Request::get("/")
            .extension(session_for(&user).await)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard/editor");
    }

    #[tokio::test]
    async fn test_mismatched_area_bounces_to_dispatcher() {
        let state = test_state();
        let user = CurrentUser {
            id: UserId::new(7),
            email: Email::parse("editor@example.com").unwrap(),
        };
        state
            .profiles()
            .prime(Profile {
                user_id: user.id,
                role: Role::Editor,
                display_name: None,
            })
            .await;

        let app = crate::routes::dashboard_routes().with_state(state);
        let request = Request::get("/publisher")
            .extension(session_for(&user).await)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }
}
