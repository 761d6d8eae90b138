//! Cart-auth synchronizer registration.
//!
//! Auth transitions reach the cart worker through the worker's own command
//! queue: the auth handlers enqueue the transition and await the send
//! before their response completes, so the reset is ordered ahead of any
//! mutation the client issues afterwards. The [`Synchronizer`] is the
//! registration handle gating that path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Active registration of the cart-auth listener.
///
/// Created via [`CartStore::init_auth_listener`]; while it is alive the
/// cart store accepts auth transitions into its queue. Dropping it
/// deactivates the listener, so no transition can fire against a store
/// that is being torn down, and frees the slot for a new registration.
///
/// [`CartStore::init_auth_listener`]: super::CartStore::init_auth_listener
#[derive(Debug)]
pub struct Synchronizer {
    listener: Arc<AtomicBool>,
}

impl Synchronizer {
    pub(crate) const fn new(listener: Arc<AtomicBool>) -> Self {
        Self { listener }
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        self.listener.store(false, Ordering::SeqCst);
        tracing::debug!("cart auth listener deactivated");
    }
}
