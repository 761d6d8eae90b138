//! Cart state and persistence seam.
//!
//! A cart is an ordered sequence of line items keyed by an owner. Ownership
//! follows authentication state: anonymous visitors get a cart keyed by
//! their session scope, signed-in users one keyed by their user id. All
//! mutations go through the [`store::CartStore`] worker so they are totally
//! ordered with respect to auth transitions.

use std::future::Future;

use serde::{Deserialize, Serialize};

use bookpress_core::{BookId, UserId};

pub mod store;
pub mod sync;

pub use store::{CartError, CartSnapshot, CartStore};
pub use sync::Synchronizer;

/// Who a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartOwner {
    /// A visitor who has not signed in, keyed by their session scope.
    Anonymous(String),
    /// A signed-in user.
    User(UserId),
}

impl CartOwner {
    /// The key under which this owner's cart blob is persisted.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::Anonymous(scope) => format!("anon:{scope}"),
            Self::User(id) => format!("user:{id}"),
        }
    }
}

/// A single cart entry: a book reference and a quantity of at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// The book this line refers to.
    pub book_id: BookId,
    /// How many copies, always >= 1.
    pub quantity: u32,
}

/// An ordered sequence of line items.
///
/// The same book never appears in two lines; adding a book already present
/// merges by summing quantities. A quantity of zero or less always means
/// removal, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Whether the cart has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total quantity across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Add `quantity` copies of a book, merging into an existing line if the
    /// book is already in the cart. Adding zero copies is a no-op.
    pub fn add_item(&mut self, book_id: BookId, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.book_id == book_id) {
            item.quantity = item.quantity.saturating_add(quantity);
        } else {
            self.items.push(LineItem { book_id, quantity });
        }
    }

    /// Remove a book's line entirely. No-op if the book is not in the cart.
    pub fn remove_item(&mut self, book_id: BookId) {
        self.items.retain(|item| item.book_id != book_id);
    }

    /// Set the exact quantity for a book. Zero removes the line; a nonzero
    /// quantity for a book not yet in the cart inserts a new line.
    pub fn set_quantity(&mut self, book_id: BookId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(book_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.book_id == book_id) {
            item.quantity = quantity;
        } else {
            self.items.push(LineItem { book_id, quantity });
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Errors from the durable cart storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The underlying database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored cart blob no longer deserializes.
    #[error("corrupt cart data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Durable storage of one cart blob per owner key.
///
/// The production implementation writes JSONB rows to Postgres; tests use an
/// in-memory map. All methods are called only from the cart worker task.
pub trait CartPersistence: Send + Sync + 'static {
    /// Load the cart persisted under `key`, if any.
    fn load(&self, key: &str) -> impl Future<Output = Result<Option<Cart>, PersistError>> + Send;

    /// Persist `cart` under `key`, replacing any previous blob.
    fn save(&self, key: &str, cart: &Cart) -> impl Future<Output = Result<(), PersistError>> + Send;

    /// Delete the blob under `key`. No-op if absent.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), PersistError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> BookId {
        BookId::generate()
    }

    #[test]
    fn test_add_merges_duplicate_book() {
        let id = book();
        let mut cart = Cart::new();
        cart.add_item(id, 1);
        cart.add_item(id, 2);
        cart.add_item(id, 3);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 6);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(book(), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let (a, b) = (book(), book());
        let mut cart = Cart::new();
        cart.add_item(a, 1);
        cart.add_item(b, 1);
        cart.add_item(a, 1);

        let ids: Vec<_> = cart.items().iter().map(|item| item.book_id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let id = book();

        let mut via_set = Cart::new();
        via_set.add_item(id, 4);
        via_set.set_quantity(id, 0);

        let mut via_remove = Cart::new();
        via_remove.add_item(id, 4);
        via_remove.remove_item(id);

        assert_eq!(via_set, via_remove);
        assert!(via_set.is_empty());
    }

    #[test]
    fn test_set_quantity_inserts_missing_book() {
        let id = book();
        let mut cart = Cart::new();
        cart.set_quantity(id, 2);
        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(book(), 1);
        cart.remove_item(book());
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_total_quantity() {
        let mut cart = Cart::new();
        cart.add_item(book(), 2);
        cart.add_item(book(), 3);
        assert_eq!(cart.total_quantity(), 5);
    }

    #[test]
    fn test_storage_keys() {
        let anon = CartOwner::Anonymous("abc".to_owned());
        assert_eq!(anon.storage_key(), "anon:abc");

        let user = CartOwner::User(UserId::new(7));
        assert_eq!(user.storage_key(), "user:7");
    }

    #[test]
    fn test_serde_wire_format() {
        let id = book();
        let mut cart = Cart::new();
        cart.add_item(id, 2);

        let json = serde_json::to_value(&cart).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!([{ "bookId": id, "quantity": 2 }])
        );
    }
}
