//! Session-related types.
//!
//! Types stored in the session for authentication and cart state.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use bookpress_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys for authentication and cart data.
pub mod session_keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the stable cart scope of this browser session.
    pub const CART_SCOPE: &str = "cart_scope";
}

/// Get (or mint) the stable cart scope key for this session.
///
/// Cart ownership for anonymous visitors and auth events are both keyed on
/// this value. It is minted once per browser session and survives session id
/// cycling at login, so the cart worker sees a consistent key across the
/// whole sign-in/sign-out lifecycle.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn cart_scope(session: &Session) -> Result<String, tower_sessions::session::Error> {
    if let Some(scope) = session.get::<String>(session_keys::CART_SCOPE).await? {
        return Ok(scope);
    }
    let scope = Uuid::new_v4().to_string();
    session.insert(session_keys::CART_SCOPE, &scope).await?;
    Ok(scope)
}
