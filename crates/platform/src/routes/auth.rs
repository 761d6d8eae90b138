//! Authentication route handlers.
//!
//! Email/password login against the local `users` table. Every identity
//! transition is handed to the cart store's queue before the response
//! completes and then published to auth event observers; handlers never
//! mutate cart contents themselves.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use bookpress_core::{Email, Role};

use crate::auth::{self, AuthError, AuthEvent, AuthEventKind};
use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session::cart_scope};
use crate::state::AppState;

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a new account and sign it in.
///
/// New accounts are always readers; staff roles are assigned via the CLI.
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let email = Email::parse(&body.email).map_err(AuthError::from)?;
    auth::validate_password(&body.password)?;
    let password_hash = auth::hash_password(&body.password)?;

    let user = UserRepository::new(state.pool())
        .create(&email, &password_hash, Role::Reader)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::Conflict(_) => AppError::Auth(AuthError::UserAlreadyExists),
            other => AppError::Database(other),
        })?;

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };
    sign_in(&state, &session, current).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "email": user.email,
            "createdAt": user.created_at,
        })),
    ))
}

/// Log in with email and password.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let email = Email::parse(&body.email).map_err(AuthError::from)?;

    let (user, stored_hash) = UserRepository::new(state.pool())
        .get_credentials(&email)
        .await?
        .ok_or(AppError::Auth(AuthError::InvalidCredentials))?;

    if !auth::verify_password(&body.password, &stored_hash) {
        return Err(AppError::Auth(AuthError::InvalidCredentials));
    }

    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
    };
    sign_in(&state, &session, current).await?;

    Ok(Json(json!({
        "id": user.id,
        "email": user.email,
        "createdAt": user.created_at,
    })))
}

/// Log out the current session.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<StatusCode> {
    let scope = cart_scope(&session).await?;
    let previous = clear_current_user(&session).await?;

    if let Some(user) = previous {
        state
            .publish_auth_event(AuthEvent {
                session: scope,
                kind: AuthEventKind::SignedOut { user: user.id },
            })
            .await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// The current session's identity.
#[instrument(skip(session))]
pub async fn me(session: Session) -> Result<Json<Value>> {
    let user: Option<CurrentUser> = session
        .get(crate::models::session_keys::CURRENT_USER)
        .await?;
    match user {
        Some(user) => Ok(Json(json!({ "id": user.id, "email": user.email }))),
        None => Err(AppError::Unauthorized("not signed in".to_owned())),
    }
}

/// Store the identity in the session and apply the matching transition.
///
/// Distinguishes a fresh sign-in from a direct switch between two users,
/// since the cart store treats them differently. The transition enqueue is
/// awaited here so a cart mutation the client issues after this response
/// cannot run ahead of the cart reset. The session id is cycled against
/// fixation; the cart scope lives in session data and survives.
async fn sign_in(state: &AppState, session: &Session, user: CurrentUser) -> Result<()> {
    let scope = cart_scope(session).await?;
    let previous: Option<CurrentUser> = session
        .get(crate::models::session_keys::CURRENT_USER)
        .await?;

    session.cycle_id().await?;
    set_current_user(session, &user).await?;

    let kind = match previous {
        Some(prev) if prev.id != user.id => AuthEventKind::Switched {
            from: prev.id,
            to: user.id,
        },
        Some(_) => return Ok(()), // same user; no transition
        None => AuthEventKind::SignedIn { user: user.id },
    };
    state
        .publish_auth_event(AuthEvent {
            session: scope,
            kind,
        })
        .await;

    Ok(())
}
