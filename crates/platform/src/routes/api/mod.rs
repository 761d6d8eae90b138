//! JSON API route handlers.

pub mod ai;
