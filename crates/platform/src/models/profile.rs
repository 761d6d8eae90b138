//! Profile domain types.

use serde::{Deserialize, Serialize};

use bookpress_core::{Role, UserId};

/// Role and display metadata associated 1:1 with a user.
///
/// Fetched lazily after sign-in; an absent profile means the user acts as a
/// plain reader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    /// The user this profile belongs to.
    pub user_id: UserId,
    /// The user's role on the platform.
    pub role: Role,
    /// Optional display name shown on dashboards.
    pub display_name: Option<String>,
}
