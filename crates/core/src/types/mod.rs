//! Core types for Bookpress.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod book;
pub mod email;
pub mod id;
pub mod role;

pub use book::BookId;
pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Role, RoleParseError};
