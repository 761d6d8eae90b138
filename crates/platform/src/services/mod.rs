//! Application services built on the repositories.

pub mod profiles;

pub use profiles::ProfileCache;
