//! User roles for the publishing platform.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A user's role on the platform.
///
/// Roles gate access to the authoring, editorial, and publishing dashboards.
/// `Reader` is the default for new accounts and for any profile whose role
/// column holds an unknown value; unknown roles are not an error condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Writes and submits manuscripts.
    Author,
    /// Reviews and edits submitted manuscripts.
    Editor,
    /// Approves and publishes finished books.
    Publisher,
    /// Browses and purchases published books.
    #[default]
    Reader,
}

/// Error returned when a role string is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct RoleParseError(pub String);

impl Role {
    /// The role's canonical lowercase name, as stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Editor => "editor",
            Self::Publisher => "publisher",
            Self::Reader => "reader",
        }
    }

    /// Parse a role, falling back to [`Role::Reader`] for unknown values.
    #[must_use]
    pub fn parse_or_default(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Whether this role may manage platform content (trigger embedding
    /// backfills, publish books).
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Editor | Self::Publisher)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "author" => Ok(Self::Author),
            "editor" => Ok(Self::Editor),
            "publisher" => Ok(Self::Publisher),
            "reader" => Ok(Self::Reader),
            other => Err(RoleParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_roles() {
        for role in [Role::Author, Role::Editor, Role::Publisher, Role::Reader] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }

    #[test]
    fn test_unknown_role_defaults_to_reader() {
        assert_eq!(Role::parse_or_default("superuser"), Role::Reader);
        assert_eq!(Role::parse_or_default(""), Role::Reader);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Editor".parse::<Role>().unwrap(), Role::Editor);
        assert_eq!(" PUBLISHER ".parse::<Role>().unwrap(), Role::Publisher);
    }

    #[test]
    fn test_staff_roles() {
        assert!(Role::Editor.is_staff());
        assert!(Role::Publisher.is_staff());
        assert!(!Role::Author.is_staff());
        assert!(!Role::Reader.is_staff());
    }

    #[test]
    fn test_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Author).unwrap(), "\"author\"");
        let role: Role = serde_json::from_str("\"publisher\"").unwrap();
        assert_eq!(role, Role::Publisher);
    }
}
