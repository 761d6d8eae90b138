//! Typed auth transition events.
//!
//! The auth state provider publishes an event for every identity transition
//! on a session: sign-in, sign-out, or a direct switch between two users.
//! The cart store receives transitions directly on its command queue (see
//! `cart::sync`); this broadcast channel carries the same events to any
//! additional observers, audit or metrics taps for instance.

use serde::Serialize;
use tokio::sync::broadcast;

use bookpress_core::UserId;

/// Default capacity of the event channel. Transitions are rare (one per
/// login/logout), so a small buffer is plenty.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// An identity transition on one session.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthEvent {
    /// The cart scope of the session the transition happened on.
    pub session: String,
    /// What changed.
    pub kind: AuthEventKind,
}

/// The kind of identity transition.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthEventKind {
    /// anonymous -> authenticated(user)
    SignedIn {
        /// The user who signed in.
        user: UserId,
    },
    /// authenticated(user) -> anonymous
    SignedOut {
        /// The user who signed out.
        user: UserId,
    },
    /// authenticated(from) -> authenticated(to) without an intervening
    /// sign-out.
    Switched {
        /// The previously signed-in user.
        from: UserId,
        /// The newly signed-in user.
        to: UserId,
    },
}

/// Handle for publishing and subscribing to auth transitions.
///
/// Cheaply cloneable; all clones share one broadcast channel.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    /// Create a new event channel.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a transition to observers. Best-effort; with no subscriber
    /// the event is simply dropped.
    pub fn publish(&self, event: AuthEvent) {
        tracing::debug!(session = %event.session, kind = ?event.kind, "auth transition");
        let _ = self.tx.send(event);
    }

    /// Subscribe to transitions.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let events = AuthEvents::new();
        let mut rx = events.subscribe();

        let event = AuthEvent {
            session: "scope-1".to_owned(),
            kind: AuthEventKind::SignedIn {
                user: UserId::new(1),
            },
        };
        events.publish(event.clone());

        assert_eq!(rx.recv().await.expect("event"), event);
    }

    #[test]
    fn test_publish_without_subscriber_does_not_panic() {
        let events = AuthEvents::new();
        events.publish(AuthEvent {
            session: "scope-1".to_owned(),
            kind: AuthEventKind::SignedOut {
                user: UserId::new(1),
            },
        });
    }
}
