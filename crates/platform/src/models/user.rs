//! User domain types.

use chrono::{DateTime, Utc};

use bookpress_core::{Email, UserId};

/// A platform user (domain type).
///
/// The password hash never leaves the `db` layer; handlers only see this.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
