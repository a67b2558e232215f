//! # Change Notification
//!
//! Tells every context sharing a storage that a key changed.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          ChangeBus                                      │
//! │                                                                         │
//! │   CartStore (tab A) ── publish("cart") ──┐                              │
//! │                                          │                              │
//! │              ┌───────────────────────────┼──────────────────────┐       │
//! │              ▼                           ▼                      ▼       │
//! │     handler (tab A)             handler (tab B)       broadcast::Sender │
//! │     reload from storage         reload from storage          │          │
//! │                                                              ▼          │
//! │                                              /api/events WebSocket tabs │
//! │                                              → GET /api/cart            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events carry only the key. Receivers always re-read storage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Capacity of the async event channel. Slow receivers skip ahead.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A key changed in storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub key: String,
}

/// Callback run for every change to a subscribed key.
pub type ChangeHandler = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Publish/subscribe on storage keys.
pub trait ChangeNotifier: Send + Sync {
    fn subscribe(&self, key: &str, handler: ChangeHandler) -> SubscriptionId;

    /// Returns `false` if the subscription was already gone.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    fn publish(&self, key: &str);
}

// =============================================================================
// Change Bus
// =============================================================================

struct Subscription {
    id: SubscriptionId,
    key: String,
    handler: ChangeHandler,
}

struct BusInner {
    subscriptions: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
    events: broadcast::Sender<ChangeEvent>,
}

/// In-process [`ChangeNotifier`].
///
/// Handlers run synchronously inside `publish`, in subscription order.
/// Every event is also sent on a broadcast channel for async consumers.
#[derive(Clone)]
pub struct ChangeBus {
    inner: Arc<BusInner>,
}

impl ChangeBus {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        ChangeBus {
            inner: Arc::new(BusInner {
                subscriptions: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                events,
            }),
        }
    }

    /// Receives every event published after this call.
    pub fn events(&self) -> broadcast::Receiver<ChangeEvent> {
        self.inner.events.subscribe()
    }

    /// Number of handlers registered for `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.lock().iter().filter(|s| s.key == key).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscription>> {
        self.inner
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscriptions", &self.lock().len())
            .finish()
    }
}

impl ChangeNotifier for ChangeBus {
    fn subscribe(&self, key: &str, handler: ChangeHandler) -> SubscriptionId {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push(Subscription {
            id,
            key: key.to_string(),
            handler,
        });
        debug!(key, id = id.0, "Subscribed to changes");
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.lock();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    fn publish(&self, key: &str) {
        let event = ChangeEvent {
            key: key.to_string(),
        };

        // Handlers run outside the lock so they may subscribe or publish.
        let handlers: Vec<ChangeHandler> = self
            .lock()
            .iter()
            .filter(|s| s.key == key)
            .map(|s| Arc::clone(&s.handler))
            .collect();

        debug!(key, handlers = handlers.len(), "Publishing change");
        for handler in handlers {
            handler(&event);
        }

        // No receivers is fine.
        let _ = self.inner.events.send(event);
    }
}
