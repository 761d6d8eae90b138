//! Domain models for the platform.

pub mod book;
pub mod profile;
pub mod session;
pub mod user;

pub use book::BookSummary;
pub use profile::Profile;
pub use session::{CurrentUser, session_keys};
pub use user::User;
