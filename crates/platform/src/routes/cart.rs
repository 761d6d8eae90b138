//! Cart route handlers.
//!
//! Handlers resolve the session's cart scope and hand the operation to the
//! cart store; the worker decides which owner the operation lands on, so a
//! concurrent sign-out can never misdirect a write.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use bookpress_core::BookId;

use crate::cart::CartSnapshot;
use crate::error::Result;
use crate::models::session::cart_scope;
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub book_id: BookId,
    /// Defaults to 1; zero or negative adds nothing.
    pub quantity: Option<i64>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub book_id: BookId,
    /// Zero or negative removes the item.
    pub quantity: i64,
}

/// Clamp a client-supplied quantity into cart range: anything at or below
/// zero becomes 0 (no-op for add, removal for update).
fn clamp_quantity(quantity: i64) -> u32 {
    u32::try_from(quantity.max(0)).unwrap_or(u32::MAX)
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveItemRequest {
    pub book_id: BookId,
}

/// Current cart contents.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Result<Json<CartSnapshot>> {
    let scope = cart_scope(&session).await?;
    Ok(Json(state.carts().snapshot(&scope).await?))
}

/// Add an item, merging with any existing line for the same book.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItemRequest>,
) -> Result<Json<CartSnapshot>> {
    let scope = cart_scope(&session).await?;
    let snapshot = state
        .carts()
        .add_item(&scope, body.book_id, clamp_quantity(body.quantity.unwrap_or(1)))
        .await?;
    Ok(Json(snapshot))
}

/// Set the exact quantity for an item; zero removes it.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<UpdateItemRequest>,
) -> Result<Json<CartSnapshot>> {
    let scope = cart_scope(&session).await?;
    let snapshot = state
        .carts()
        .update_quantity(&scope, body.book_id, clamp_quantity(body.quantity))
        .await?;
    Ok(Json(snapshot))
}

/// Remove an item entirely.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<RemoveItemRequest>,
) -> Result<Json<CartSnapshot>> {
    let scope = cart_scope(&session).await?;
    let snapshot = state.carts().remove_item(&scope, body.book_id).await?;
    Ok(Json(snapshot))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Json<CartSnapshot>> {
    let scope = cart_scope(&session).await?;
    Ok(Json(state.carts().clear(&scope).await?))
}

/// Total item count, for the cart badge.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<Json<Value>> {
    let scope = cart_scope(&session).await?;
    let snapshot = state.carts().snapshot(&scope).await?;
    Ok(Json(json!({ "count": snapshot.total_quantity })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(-3), 0);
        assert_eq!(clamp_quantity(0), 0);
        assert_eq!(clamp_quantity(4), 4);
        assert_eq!(clamp_quantity(i64::MAX), u32::MAX);
    }
}
