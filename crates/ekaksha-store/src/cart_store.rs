//! # Cart Store
//!
//! The authoritative, persisted shopping cart.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add_item / increment / decrement / remove_item / clear                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  lock cart ──► apply rule (ekaksha-core)                                │
//! │       │              │                                                  │
//! │       │              └── rule error ──► return, nothing changed         │
//! │       ▼                                                                 │
//! │  write full snapshot to storage["cart"]                                 │
//! │       │                                                                 │
//! │       ├── write failed ──► memory keeps the change,                    │
//! │       │                    no notification, Err(Persistence)            │
//! │       ▼                                                                 │
//! │  unlock ──► notifier.publish("cart")                                    │
//! │                  │                                                      │
//! │                  └──► every CartStore on the notifier reloads           │
//! │                       from storage (including this one)                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Stores sharing a storage follow last-writer-wins: each write replaces the
//! whole snapshot. A store that mutates before it has processed another
//! store's notification overwrites that store's change.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use ekaksha_core::{Cart, CartLine, CartSummary, CoreResult, CouponSelection};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::notify::{ChangeEvent, ChangeHandler, ChangeNotifier, SubscriptionId};
use crate::storage::KeyValueStorage;

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

struct Shared {
    cart: Mutex<Cart>,
    storage: Arc<dyn KeyValueStorage>,
    notifier: Arc<dyn ChangeNotifier>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, cart: &Cart) -> StoreResult<()> {
        let json = serde_json::to_string(cart)?;
        self.storage.set(CART_KEY, &json)
    }

    fn reload(&self) -> Cart {
        let cart = read_persisted(self.storage.as_ref());
        *self.lock() = cart.clone();
        cart
    }
}

/// Reads the persisted cart, falling back to an empty cart.
///
/// Never fails: an absent key, an unreadable storage or a malformed value
/// all give an empty cart.
pub fn read_persisted(storage: &dyn KeyValueStorage) -> Cart {
    let raw = match storage.get(CART_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Cart storage unreadable, starting with an empty cart");
            return Cart::new();
        }
    };

    match decode(&raw) {
        Ok(cart) => cart,
        Err(e) => {
            warn!(error = %e, "Discarding malformed cart");
            Cart::new()
        }
    }
}

/// Decodes a persisted cart snapshot, checking the cart invariants.
pub fn decode(raw: &str) -> StoreResult<Cart> {
    let lines: Vec<CartLine> =
        serde_json::from_str(raw).map_err(|e| StoreError::malformed(CART_KEY, e))?;
    Cart::from_lines(lines).map_err(|e| StoreError::malformed(CART_KEY, e))
}

// =============================================================================
// Cart Store
// =============================================================================

/// A cart bound to a storage and a change notifier.
///
/// ## Lifecycle
/// - `open`: loads the persisted cart and subscribes to `"cart"` changes
/// - every mutation: persist, then publish
/// - drop: unsubscribes
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use ekaksha_core::{CartLine, Money};
/// use ekaksha_store::{CartStore, ChangeBus, MemoryStorage};
///
/// let storage = Arc::new(MemoryStorage::new());
/// let bus = Arc::new(ChangeBus::new());
///
/// let store = CartStore::open(storage.clone(), bus.clone());
/// store
///     .add_item(CartLine::new("tee-1", "Cotton Tee", 2, Money::from_rupees(1000)), 3)
///     .unwrap();
///
/// let fresh = CartStore::open(storage, bus);
/// assert_eq!(fresh.snapshot(), store.snapshot());
/// ```
pub struct CartStore {
    shared: Arc<Shared>,
    subscription: SubscriptionId,
}

impl CartStore {
    /// Opens the cart persisted in `storage`.
    pub fn open(storage: Arc<dyn KeyValueStorage>, notifier: Arc<dyn ChangeNotifier>) -> Self {
        let cart = read_persisted(storage.as_ref());
        debug!(lines = cart.len(), "Opened cart store");

        let shared = Arc::new(Shared {
            cart: Mutex::new(cart),
            storage,
            notifier: Arc::clone(&notifier),
        });

        let weak: Weak<Shared> = Arc::downgrade(&shared);
        let handler: ChangeHandler = Arc::new(move |_event: &ChangeEvent| {
            if let Some(shared) = weak.upgrade() {
                shared.reload();
            }
        });
        let subscription = notifier.subscribe(CART_KEY, handler);

        CartStore {
            shared,
            subscription,
        }
    }

    /// Reads the persisted cart without touching this store's view.
    pub fn load(&self) -> Cart {
        read_persisted(self.shared.storage.as_ref())
    }

    /// Replaces this store's view with the persisted cart.
    ///
    /// This is what runs when a change notification arrives.
    pub fn reload(&self) -> Cart {
        self.shared.reload()
    }

    /// A copy of the current cart.
    pub fn snapshot(&self) -> Cart {
        self.shared.lock().clone()
    }

    pub fn summary(&self) -> CartSummary {
        self.shared.lock().summary()
    }

    pub fn summary_with(&self, selection: &CouponSelection) -> CartSummary {
        self.shared.lock().summary_with(selection)
    }

    /// Adds `quantity` offer bundles, merging into an existing line.
    ///
    /// Returns the line's new quantity.
    pub fn add_item(&self, line: CartLine, quantity: u32) -> StoreResult<u32> {
        let product_id = line.product_id.clone();
        debug!(%product_id, quantity, "add_item");
        self.mutate(|cart| cart.add(line, quantity))
    }

    /// Adds one offer bundle. Unknown ids fail with `LineNotFound`.
    pub fn increment(&self, product_id: &str) -> StoreResult<u32> {
        debug!(product_id, "increment");
        self.mutate(|cart| cart.increment(product_id))
    }

    /// Removes one offer bundle, stopping at 1. Unknown ids fail with
    /// `LineNotFound`.
    pub fn decrement(&self, product_id: &str) -> StoreResult<u32> {
        debug!(product_id, "decrement");
        self.mutate(|cart| cart.decrement(product_id))
    }

    /// Drops a line whatever its quantity. Unknown ids fail with
    /// `LineNotFound`.
    pub fn remove_item(&self, product_id: &str) -> StoreResult<CartLine> {
        debug!(product_id, "remove_item");
        self.mutate(|cart| cart.remove(product_id))
    }

    pub fn clear(&self) -> StoreResult<()> {
        debug!("clear");
        self.mutate(|cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Applies `op`, persists the whole cart, then notifies.
    fn mutate<R>(&self, op: impl FnOnce(&mut Cart) -> CoreResult<R>) -> StoreResult<R> {
        let (value, persisted) = {
            let mut cart = self.shared.lock();
            let value = op(&mut cart)?;
            let persisted = self.shared.persist(&cart);
            (value, persisted)
        };

        match persisted {
            Ok(()) => {
                self.shared.notifier.publish(CART_KEY);
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "Cart changed in memory but could not be persisted");
                Err(e)
            }
        }
    }
}

impl Drop for CartStore {
    fn drop(&mut self) {
        self.shared.notifier.unsubscribe(self.subscription);
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &*self.shared.lock())
            .field("subscription", &self.subscription)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChangeBus;
    use crate::storage::{FileStorage, MemoryStorage};
    use chrono::NaiveDate;
    use ekaksha_core::{CoreError, CouponDescriptor, Money};

    struct Fixture {
        storage: Arc<MemoryStorage>,
        bus: Arc<ChangeBus>,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                storage: Arc::new(MemoryStorage::new()),
                bus: Arc::new(ChangeBus::new()),
            }
        }

        fn open(&self) -> CartStore {
            CartStore::open(self.storage.clone(), self.bus.clone())
        }
    }

    fn shirt() -> CartLine {
        CartLine::new("shirt-1", "Linen Shirt", 2, Money::from_rupees(1000))
    }

    fn kurta() -> CartLine {
        CartLine::new("kurta-1", "Cotton Kurta", 1, Money::from_rupees(750))
    }

    #[test]
    fn test_decrement_floor() {
        let fx = Fixture::new();
        let store = fx.open();
        store.add_item(shirt(), 1).unwrap();

        for _ in 0..3 {
            assert_eq!(store.decrement("shirt-1").unwrap(), 1);
        }
        assert_eq!(store.load().line("shirt-1").unwrap().quantity_in_cart, 1);
    }

    #[test]
    fn test_add_merges_by_product_id() {
        let fx = Fixture::new();
        let store = fx.open();
        store.add_item(shirt(), 1).unwrap();
        store.add_item(shirt(), 1).unwrap();

        let cart = store.snapshot();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.line("shirt-1").unwrap().quantity_in_cart, 2);
    }

    #[test]
    fn test_totals() {
        let fx = Fixture::new();
        let store = fx.open();
        store.add_item(shirt(), 3).unwrap();

        let summary = store.summary();
        assert_eq!(summary.total_items, 6);
        assert_eq!(summary.subtotal, Money::from_rupees(3000));
    }

    #[test]
    fn test_summary_with_coupon() {
        let fx = Fixture::new();
        let store = fx.open();
        store.add_item(shirt(), 3).unwrap();

        let mut selection = CouponSelection::default();
        selection
            .select(
                CouponDescriptor {
                    id: "c".into(),
                    code: "FREE".into(),
                    discount_percent: 100,
                    expiry_date: None,
                    description: None,
                },
                NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            )
            .unwrap();

        assert_eq!(store.summary_with(&selection).grand_total, Money::zero());
    }

    #[test]
    fn test_persistence_round_trip() {
        let fx = Fixture::new();
        let store = fx.open();
        store
            .add_item(shirt().with_description("Breathable").with_image_url("https://cdn/s.png"), 2)
            .unwrap();
        store.add_item(kurta(), 1).unwrap();

        let fresh = fx.open();
        assert_eq!(fresh.snapshot(), store.snapshot());
        assert_eq!(fresh.load(), store.snapshot());
    }

    #[test]
    fn test_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let bus = Arc::new(ChangeBus::new());
        {
            let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
            let store = CartStore::open(storage, bus.clone());
            store.add_item(shirt(), 4).unwrap();
        }

        let storage = Arc::new(FileStorage::open(dir.path()).unwrap());
        let store = CartStore::open(storage, bus);
        assert_eq!(store.snapshot().line("shirt-1").unwrap().quantity_in_cart, 4);
    }

    #[test]
    fn test_malformed_storage_loads_empty() {
        for raw in [
            r#"{"not":"an array"}"#,
            "not json at all",
            "42",
            r#"[{"productId":"a","unitOfferQuantity":1,"unitOfferPrice":100,"quantityInCart":0,"name":"A"}]"#,
            r#"[{"productId":"a","unitOfferQuantity":1,"unitOfferPrice":100,"quantityInCart":-3,"name":"A"}]"#,
        ] {
            let fx = Fixture::new();
            fx.storage.set(CART_KEY, raw).unwrap();

            let store = fx.open();
            assert!(store.snapshot().is_empty(), "expected empty cart for {}", raw);
            assert!(store.load().is_empty());
        }
    }

    #[test]
    fn test_decode_reports_malformed_state() {
        assert!(matches!(decode("{}"), Err(StoreError::MalformedState { .. })));
        assert!(decode("[]").unwrap().is_empty());
    }

    #[test]
    fn test_empty_cart_not_persisted_on_open() {
        let fx = Fixture::new();
        let _store = fx.open();
        assert_eq!(fx.storage.get(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_unknown_line_changes_nothing_and_does_not_notify() {
        let fx = Fixture::new();
        let store = fx.open();
        store.add_item(shirt(), 1).unwrap();
        let persisted = fx.storage.get(CART_KEY).unwrap();
        let mut events = fx.bus.events();

        for result in [store.increment("ghost"), store.decrement("ghost")] {
            assert!(matches!(
                result,
                Err(StoreError::Cart(CoreError::LineNotFound(ref id))) if id == "ghost"
            ));
        }
        assert!(matches!(
            store.remove_item("ghost"),
            Err(StoreError::Cart(CoreError::LineNotFound(_)))
        ));

        assert_eq!(fx.storage.get(CART_KEY).unwrap(), persisted);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_remove_and_clear_persist() {
        let fx = Fixture::new();
        let store = fx.open();
        store.add_item(shirt(), 5).unwrap();
        store.add_item(kurta(), 1).unwrap();

        let removed = store.remove_item("shirt-1").unwrap();
        assert_eq!(removed.quantity_in_cart, 5);
        assert_eq!(store.load().len(), 1);

        store.clear().unwrap();
        assert!(store.load().is_empty());
        assert_eq!(fx.storage.get(CART_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_write_failure_keeps_memory_and_skips_notification() {
        let storage = Arc::new(MemoryStorage::new());
        let bus = Arc::new(ChangeBus::new());
        let store = CartStore::open(storage.clone(), bus.clone());
        let mut events = bus.events();

        storage.set_disabled(true);
        let err = store.add_item(shirt(), 2).unwrap_err();
        assert!(err.is_persistence());

        // This tab keeps working with the unsaved change.
        assert_eq!(store.snapshot().line("shirt-1").unwrap().quantity_in_cart, 2);
        assert!(events.try_recv().is_err());

        storage.set_disabled(false);
        assert_eq!(storage.get(CART_KEY).unwrap(), None);

        // The next successful write persists everything.
        store.increment("shirt-1").unwrap();
        assert_eq!(store.load().line("shirt-1").unwrap().quantity_in_cart, 3);
    }

    #[test]
    fn test_quota_exceeded_is_persistence_error() {
        let storage = Arc::new(MemoryStorage::with_quota(16));
        let store = CartStore::open(storage, Arc::new(ChangeBus::new()));
        assert!(store.add_item(shirt(), 1).unwrap_err().is_persistence());
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn test_cross_tab_notification() {
        let fx = Fixture::new();
        let tab_a = fx.open();
        let tab_b = fx.open();

        tab_a.add_item(shirt(), 2).unwrap();
        tab_a.increment("shirt-1").unwrap();

        // Tab B was reloaded by the notification.
        assert_eq!(tab_b.snapshot(), tab_a.load());

        // Invoking the reload handler directly gives the same view.
        assert_eq!(tab_b.reload(), tab_a.snapshot());
    }

    #[test]
    fn test_mutation_publishes_on_bus() {
        let fx = Fixture::new();
        let store = fx.open();
        let mut events = fx.bus.events();

        store.add_item(kurta(), 1).unwrap();
        assert_eq!(events.try_recv().unwrap().key, CART_KEY);
    }

    #[test]
    fn test_stale_tab_overwrites_last_writer_wins() {
        // Two stores share storage but not a notifier, so B never hears
        // about A's write. This race is accepted, not prevented.
        let storage = Arc::new(MemoryStorage::new());
        let tab_a = CartStore::open(storage.clone(), Arc::new(ChangeBus::new()));
        let tab_b = CartStore::open(storage.clone(), Arc::new(ChangeBus::new()));

        tab_a.add_item(shirt(), 1).unwrap();
        tab_b.add_item(kurta(), 1).unwrap();

        let persisted = read_persisted(storage.as_ref());
        assert!(persisted.line("shirt-1").is_none());
        assert!(persisted.line("kurta-1").is_some());
    }

    #[test]
    fn test_drop_unsubscribes() {
        let fx = Fixture::new();
        let store = fx.open();
        assert_eq!(fx.bus.subscriber_count(CART_KEY), 1);
        drop(store);
        assert_eq!(fx.bus.subscriber_count(CART_KEY), 0);
    }
}
