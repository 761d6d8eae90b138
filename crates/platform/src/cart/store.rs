//! The cart store worker.
//!
//! All cart access goes through a single worker task fed by an mpsc queue.
//! Auth transitions travel through the same queue as mutations, enqueued
//! synchronously by the auth handlers before their response completes, so a
//! mutation issued on either side of a transition is resolved against the
//! session's *post-transition* owner: the worker maps session scope to
//! identity at processing time, never at enqueue time. This closes both
//! races around a transition, the stale write landing after a sign-out
//! clear and the post-login add being wiped by a late sign-in reset.
//!
//! Durable storage is the source of truth; the worker holds no cart copies
//! between commands, only the bounded session-to-identity map.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use bookpress_core::{BookId, UserId};

use super::sync::Synchronizer;
use super::{Cart, CartOwner, CartPersistence, LineItem, PersistError};
use crate::auth::events::{AuthEvent, AuthEventKind};

/// Depth of the command queue. Deep enough to absorb bursts without
/// meaningfully delaying backpressure.
const COMMAND_QUEUE_DEPTH: usize = 256;

/// Upper bound on tracked session identities.
const IDENTITY_CACHE_CAPACITY: u64 = 100_000;

/// Idle lifetime of a tracked identity; matches the session inactivity
/// expiry, after which the scope cannot belong to a live signed-in session.
const IDENTITY_IDLE_EXPIRY: Duration = Duration::from_secs(14 * 24 * 60 * 60);

/// Errors surfaced to cart route handlers.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    /// Durable storage failed.
    #[error(transparent)]
    Persist(#[from] PersistError),

    /// The worker task is gone; only happens during shutdown.
    #[error("cart store unavailable")]
    Unavailable,
}

/// A point-in-time view of one cart, as returned to handlers.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    /// Line items in insertion order.
    pub items: Vec<LineItem>,
    /// Total quantity across all lines.
    pub total_quantity: u32,
}

impl From<&Cart> for CartSnapshot {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            total_quantity: cart.total_quantity(),
        }
    }
}

/// A single cart mutation.
#[derive(Debug, Clone)]
pub enum CartOp {
    /// Merge `quantity` copies of a book into the cart.
    Add {
        /// Book to add.
        book_id: BookId,
        /// Copies to add; zero is a no-op.
        quantity: u32,
    },
    /// Set the exact quantity for a book; zero removes it.
    SetQuantity {
        /// Book to update.
        book_id: BookId,
        /// New quantity.
        quantity: u32,
    },
    /// Remove a book's line entirely.
    Remove {
        /// Book to remove.
        book_id: BookId,
    },
    /// Empty the cart.
    Clear,
}

/// Commands processed by the worker, in arrival order.
pub(crate) enum Command {
    Mutate {
        scope: String,
        op: CartOp,
        reply: oneshot::Sender<Result<CartSnapshot, CartError>>,
    },
    Snapshot {
        scope: String,
        reply: oneshot::Sender<Result<CartSnapshot, CartError>>,
    },
    Auth(AuthEvent),
}

/// Handle to the cart worker.
///
/// Cheaply cloneable; owned by the application state and injected into
/// handlers rather than reached through globals.
#[derive(Debug, Clone)]
pub struct CartStore {
    tx: mpsc::Sender<Command>,
    auth_listener: Arc<AtomicBool>,
}

impl CartStore {
    /// Spawn the worker task over the given persistence backend and return
    /// a handle to it.
    #[must_use]
    pub fn spawn<P: CartPersistence>(persistence: P) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let identities = moka::sync::Cache::builder()
            .max_capacity(IDENTITY_CACHE_CAPACITY)
            .time_to_idle(IDENTITY_IDLE_EXPIRY)
            .build();
        tokio::spawn(
            Worker {
                persistence,
                identities,
            }
            .run(rx),
        );
        Self {
            tx,
            auth_listener: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Register the auth listener, returning the synchronizer that must be
    /// kept alive for cart-auth reconciliation to run.
    ///
    /// Idempotent: a second call does nothing and returns `None`, so the
    /// store can never end up applying a transition twice. The returned
    /// [`Synchronizer`] deactivates the listener when dropped.
    pub fn init_auth_listener(&self) -> Option<Synchronizer> {
        if self.auth_listener.swap(true, Ordering::SeqCst) {
            tracing::warn!("cart auth listener already registered; ignoring");
            return None;
        }
        Some(Synchronizer::new(Arc::clone(&self.auth_listener)))
    }

    /// Merge `quantity` copies of a book into the session's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if persistence fails or the worker is gone.
    pub async fn add_item(
        &self,
        scope: &str,
        book_id: BookId,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        self.mutate(scope, CartOp::Add { book_id, quantity }).await
    }

    /// Set the exact quantity for a book; zero removes it.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if persistence fails or the worker is gone.
    pub async fn update_quantity(
        &self,
        scope: &str,
        book_id: BookId,
        quantity: u32,
    ) -> Result<CartSnapshot, CartError> {
        self.mutate(scope, CartOp::SetQuantity { book_id, quantity })
            .await
    }

    /// Remove a book from the session's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if persistence fails or the worker is gone.
    pub async fn remove_item(
        &self,
        scope: &str,
        book_id: BookId,
    ) -> Result<CartSnapshot, CartError> {
        self.mutate(scope, CartOp::Remove { book_id }).await
    }

    /// Empty the session's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if persistence fails or the worker is gone.
    pub async fn clear(&self, scope: &str) -> Result<CartSnapshot, CartError> {
        self.mutate(scope, CartOp::Clear).await
    }

    /// Current view of the session's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if persistence fails or the worker is gone.
    pub async fn snapshot(&self, scope: &str) -> Result<CartSnapshot, CartError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Snapshot {
                scope: scope.to_owned(),
                reply,
            })
            .await
            .map_err(|_| CartError::Unavailable)?;
        rx.await.map_err(|_| CartError::Unavailable)?
    }

    /// Enqueue an auth transition onto the worker queue.
    ///
    /// Once this returns, the transition sits ahead of every later command
    /// in the queue; callers must await it before completing the request
    /// that caused the transition, so a mutation the client issues next can
    /// never overtake the reset. Dropped with a warning while no listener
    /// is registered.
    pub(crate) async fn apply_auth_event(&self, event: AuthEvent) {
        if !self.auth_listener.load(Ordering::SeqCst) {
            tracing::warn!("no cart auth listener registered; dropping transition");
            return;
        }
        if self.tx.send(Command::Auth(event)).await.is_err() {
            tracing::warn!("cart worker gone; dropping auth transition");
        }
    }

    async fn mutate(&self, scope: &str, op: CartOp) -> Result<CartSnapshot, CartError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::Mutate {
                scope: scope.to_owned(),
                op,
                reply,
            })
            .await
            .map_err(|_| CartError::Unavailable)?;
        rx.await.map_err(|_| CartError::Unavailable)?
    }
}

/// Worker state: the session-to-identity map, touched only from the worker
/// task. Carts themselves live in durable storage and are read through on
/// every command, so a failed write is never visible afterwards and no
/// per-visitor memory accumulates.
struct Worker<P> {
    persistence: P,
    /// Which user each session scope is currently signed in as. Absent
    /// means anonymous. Bounded and idle-expired so scopes of sessions
    /// that die without a sign-out do not pile up.
    identities: moka::sync::Cache<String, UserId>,
}

impl<P: CartPersistence> Worker<P> {
    async fn run(self, mut rx: mpsc::Receiver<Command>) {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Mutate { scope, op, reply } => {
                    let result = self.mutate(&scope, op).await;
                    let _ = reply.send(result);
                }
                Command::Snapshot { scope, reply } => {
                    let result = self.snapshot(&scope).await;
                    let _ = reply.send(result);
                }
                Command::Auth(event) => self.apply_auth(event).await,
            }
        }
        tracing::debug!("cart worker stopped");
    }

    /// Resolve the current owner for a session scope.
    fn owner_for(&self, scope: &str) -> CartOwner {
        self.identities
            .get(scope)
            .map_or_else(|| CartOwner::Anonymous(scope.to_owned()), CartOwner::User)
    }

    async fn mutate(&self, scope: &str, op: CartOp) -> Result<CartSnapshot, CartError> {
        let key = self.owner_for(scope).storage_key();
        let mut cart = self.persistence.load(&key).await?.unwrap_or_default();

        match op {
            CartOp::Add { book_id, quantity } => cart.add_item(book_id, quantity),
            CartOp::SetQuantity { book_id, quantity } => cart.set_quantity(book_id, quantity),
            CartOp::Remove { book_id } => cart.remove_item(book_id),
            CartOp::Clear => cart.clear(),
        }

        self.persistence.save(&key, &cart).await?;
        Ok(CartSnapshot::from(&cart))
    }

    async fn snapshot(&self, scope: &str) -> Result<CartSnapshot, CartError> {
        let key = self.owner_for(scope).storage_key();
        let cart = self.persistence.load(&key).await?.unwrap_or_default();
        Ok(CartSnapshot::from(&cart))
    }

    /// Reconcile cart state with an identity transition.
    ///
    /// The anonymous cart is always discarded on sign-in; pre-login
    /// selections never merge into an account. Sign-out clears the
    /// session's anonymous cart but leaves the user's persisted cart for
    /// their next login.
    async fn apply_auth(&self, event: AuthEvent) {
        let anon_key = CartOwner::Anonymous(event.session.clone()).storage_key();
        match event.kind {
            AuthEventKind::SignedIn { user } => {
                self.discard(&anon_key).await;
                self.identities.insert(event.session, user);
            }
            AuthEventKind::SignedOut { .. } => {
                self.identities.invalidate(&event.session);
                self.discard(&anon_key).await;
            }
            AuthEventKind::Switched { to, .. } => {
                self.identities.insert(event.session, to);
            }
        }
    }

    /// Drop a cart from durable storage.
    async fn discard(&self, key: &str) {
        if let Err(e) = self.persistence.remove(key).await {
            tracing::warn!(key, "failed to discard persisted cart: {e}");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory persistence for worker tests. Writes can be made to fail
    /// to exercise the error paths.
    #[derive(Debug, Clone, Default)]
    struct MemoryPersistence {
        inner: Arc<Mutex<HashMap<String, Cart>>>,
        fail_saves: Arc<AtomicBool>,
    }

    impl MemoryPersistence {
        fn stored(&self, key: &str) -> Option<Cart> {
            self.inner.lock().unwrap().get(key).cloned()
        }

        fn seed(&self, key: &str, cart: Cart) {
            self.inner.lock().unwrap().insert(key.to_owned(), cart);
        }

        fn set_fail_saves(&self, fail: bool) {
            self.fail_saves.store(fail, Ordering::SeqCst);
        }
    }

    impl CartPersistence for MemoryPersistence {
        async fn load(&self, key: &str) -> Result<Option<Cart>, PersistError> {
            Ok(self.inner.lock().unwrap().get(key).cloned())
        }

        async fn save(&self, key: &str, cart: &Cart) -> Result<(), PersistError> {
            if self.fail_saves.load(Ordering::SeqCst) {
                return Err(PersistError::Database(sqlx::Error::PoolClosed));
            }
            self.inner
                .lock()
                .unwrap()
                .insert(key.to_owned(), cart.clone());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), PersistError> {
            self.inner.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn listening_store(persistence: MemoryPersistence) -> (CartStore, Synchronizer) {
        let store = CartStore::spawn(persistence);
        let synchronizer = store.init_auth_listener().unwrap();
        (store, synchronizer)
    }

    fn signed_in(scope: &str, user: i64) -> AuthEvent {
        AuthEvent {
            session: scope.to_owned(),
            kind: AuthEventKind::SignedIn {
                user: UserId::new(user),
            },
        }
    }

    fn signed_out(scope: &str, user: i64) -> AuthEvent {
        AuthEvent {
            session: scope.to_owned(),
            kind: AuthEventKind::SignedOut {
                user: UserId::new(user),
            },
        }
    }

    fn switched(scope: &str, from: i64, to: i64) -> AuthEvent {
        AuthEvent {
            session: scope.to_owned(),
            kind: AuthEventKind::Switched {
                from: UserId::new(from),
                to: UserId::new(to),
            },
        }
    }

    #[tokio::test]
    async fn test_add_merges_and_persists() {
        let persistence = MemoryPersistence::default();
        let store = CartStore::spawn(persistence.clone());
        let book = BookId::generate();

        store.add_item("s1", book, 1).await.unwrap();
        let snapshot = store.add_item("s1", book, 2).await.unwrap();

        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.total_quantity, 3);

        let stored = persistence.stored("anon:s1").expect("persisted");
        assert_eq!(stored.total_quantity(), 3);
    }

    #[tokio::test]
    async fn test_update_to_zero_equals_remove() {
        let store = CartStore::spawn(MemoryPersistence::default());
        let book = BookId::generate();

        store.add_item("s1", book, 4).await.unwrap();
        let via_update = store.update_quantity("s1", book, 0).await.unwrap();
        assert!(via_update.items.is_empty());

        store.add_item("s1", book, 4).await.unwrap();
        let via_remove = store.remove_item("s1", book).await.unwrap();
        assert_eq!(via_update, via_remove);
    }

    #[tokio::test]
    async fn test_sign_in_discards_anonymous_cart() {
        let persistence = MemoryPersistence::default();
        let (store, _synchronizer) = listening_store(persistence.clone());

        store.add_item("s1", BookId::generate(), 2).await.unwrap();
        store.apply_auth_event(signed_in("s1", 7)).await;

        let snapshot = store.snapshot("s1").await.unwrap();
        assert!(snapshot.items.is_empty(), "anonymous cart must not merge");

        // Later mutations run under user:7, and the pre-login blob is gone.
        store.add_item("s1", BookId::generate(), 1).await.unwrap();
        assert!(persistence.stored("anon:s1").is_none());
        assert_eq!(persistence.stored("user:7").unwrap().total_quantity(), 1);
    }

    #[tokio::test]
    async fn test_sign_in_restores_persisted_cart() {
        let persistence = MemoryPersistence::default();
        let mut saved = Cart::new();
        saved.add_item(BookId::generate(), 5);
        persistence.seed("user:7", saved);

        let (store, _synchronizer) = listening_store(persistence);
        store.apply_auth_event(signed_in("s1", 7)).await;

        let snapshot = store.snapshot("s1").await.unwrap();
        assert_eq!(snapshot.total_quantity, 5);
    }

    #[tokio::test]
    async fn test_mutation_after_sign_in_survives_the_reset() {
        let persistence = MemoryPersistence::default();
        let (store, _synchronizer) = listening_store(persistence.clone());
        let book = BookId::generate();

        // The transition is in the queue once apply_auth_event returns, so
        // an add issued right after it must land on the user's cart, not on
        // the anonymous cart the sign-in is about to discard.
        store.apply_auth_event(signed_in("s1", 7)).await;
        let snapshot = store.add_item("s1", book, 1).await.unwrap();
        assert_eq!(snapshot.total_quantity, 1);

        let after = store.snapshot("s1").await.unwrap();
        assert_eq!(after.total_quantity, 1, "post-login add must survive");
        assert_eq!(persistence.stored("user:7").unwrap().total_quantity(), 1);
        assert!(persistence.stored("anon:s1").is_none());
    }

    #[tokio::test]
    async fn test_sign_out_always_yields_empty_cart() {
        let persistence = MemoryPersistence::default();
        let (store, _synchronizer) = listening_store(persistence.clone());

        store.apply_auth_event(signed_in("s1", 7)).await;
        store.add_item("s1", BookId::generate(), 3).await.unwrap();
        store.apply_auth_event(signed_out("s1", 7)).await;

        let snapshot = store.snapshot("s1").await.unwrap();
        assert!(snapshot.items.is_empty());

        // The user's own cart survives in storage for their next login.
        assert_eq!(persistence.stored("user:7").unwrap().total_quantity(), 3);
    }

    #[tokio::test]
    async fn test_switch_never_exposes_previous_users_items() {
        let (store, _synchronizer) = listening_store(MemoryPersistence::default());

        store.apply_auth_event(signed_in("s1", 1)).await;
        store.add_item("s1", BookId::generate(), 9).await.unwrap();

        store.apply_auth_event(switched("s1", 1, 2)).await;
        let snapshot = store.snapshot("s1").await.unwrap();
        assert!(snapshot.items.is_empty());
    }

    #[tokio::test]
    async fn test_mutation_enqueued_after_sign_out_misses_user_cart() {
        let persistence = MemoryPersistence::default();
        let (store, _synchronizer) = listening_store(persistence.clone());
        let book = BookId::generate();

        store.apply_auth_event(signed_in("s1", 7)).await;
        store.add_item("s1", book, 1).await.unwrap();

        // The sign-out is enqueued before the write, so the write must
        // resolve to the anonymous owner even though the caller still
        // believed it was signed in.
        store.apply_auth_event(signed_out("s1", 7)).await;
        store.add_item("s1", book, 5).await.unwrap();

        assert_eq!(persistence.stored("user:7").unwrap().total_quantity(), 1);
        assert_eq!(persistence.stored("anon:s1").unwrap().total_quantity(), 5);
    }

    #[tokio::test]
    async fn test_failed_save_is_not_visible_afterwards() {
        let persistence = MemoryPersistence::default();
        let store = CartStore::spawn(persistence.clone());
        let book = BookId::generate();

        store.add_item("s1", book, 2).await.unwrap();

        persistence.set_fail_saves(true);
        let result = store.add_item("s1", book, 5).await;
        assert!(matches!(result, Err(CartError::Persist(_))));
        persistence.set_fail_saves(false);

        // The rejected write must not leak into later reads.
        let snapshot = store.snapshot("s1").await.unwrap();
        assert_eq!(snapshot.total_quantity, 2);
        assert_eq!(persistence.stored("anon:s1").unwrap().total_quantity(), 2);
    }

    #[tokio::test]
    async fn test_worker_reads_through_to_storage() {
        let persistence = MemoryPersistence::default();
        let store = CartStore::spawn(persistence.clone());

        store.add_item("s1", BookId::generate(), 1).await.unwrap();

        // Reads reflect storage directly; the worker keeps no cart copy of
        // its own that could go stale or grow with visitor count.
        let mut replaced = Cart::new();
        replaced.add_item(BookId::generate(), 8);
        persistence.seed("anon:s1", replaced);

        let snapshot = store.snapshot("s1").await.unwrap();
        assert_eq!(snapshot.total_quantity, 8);
    }

    #[tokio::test]
    async fn test_init_auth_listener_is_idempotent() {
        let store = CartStore::spawn(MemoryPersistence::default());

        let first = store.init_auth_listener();
        assert!(first.is_some());
        assert!(store.init_auth_listener().is_none());
    }

    #[tokio::test]
    async fn test_unregistered_store_ignores_transitions() {
        let persistence = MemoryPersistence::default();
        let store = CartStore::spawn(persistence.clone());

        store.add_item("s1", BookId::generate(), 2).await.unwrap();
        store.apply_auth_event(signed_in("s1", 7)).await;

        let snapshot = store.snapshot("s1").await.unwrap();
        assert_eq!(snapshot.total_quantity, 2, "unwired listener must not fire");
        assert!(persistence.stored("anon:s1").is_some());
    }

    #[tokio::test]
    async fn test_dropped_listener_stops_applying_events() {
        let store = CartStore::spawn(MemoryPersistence::default());
        let synchronizer = store.init_auth_listener().unwrap();
        drop(synchronizer);

        store.add_item("s1", BookId::generate(), 2).await.unwrap();
        store.apply_auth_event(signed_in("s1", 7)).await;

        let snapshot = store.snapshot("s1").await.unwrap();
        assert_eq!(snapshot.total_quantity, 2, "torn-down listener must not fire");
    }
}
