//! # Cart State
//!
//! The persisted cart plus the coupon chosen while viewing it.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State                                           │
//! │                                                                         │
//! │  CartStore (ekaksha-store)          Mutex<CouponSelection>              │
//! │  ─────────────────────────          ──────────────────────              │
//! │  lines, persisted under "cart"      NoCoupon | Selected(coupon)         │
//! │  reloads on every "cart" change     lives only as long as the process   │
//! │           │                                    │                        │
//! │           └──────────── summary_with ──────────┘                        │
//! │                              │                                          │
//! │                              ▼                                          │
//! │              CartSummary { subtotal, discount, grand_total }            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The coupon selection is never written to storage, so a restart drops it
//! while the cart itself survives.

use std::sync::{Mutex, MutexGuard, PoisonError};

use ekaksha_core::{CartSummary, CouponSelection};
use ekaksha_store::CartStore;

#[derive(Debug)]
pub struct CartState {
    store: CartStore,
    coupon: Mutex<CouponSelection>,
}

impl CartState {
    pub fn new(store: CartStore) -> Self {
        CartState {
            store,
            coupon: Mutex::new(CouponSelection::default()),
        }
    }

    pub fn store(&self) -> &CartStore {
        &self.store
    }

    /// Runs `f` with exclusive access to the coupon selection.
    pub fn with_coupon<R>(&self, f: impl FnOnce(&mut CouponSelection) -> R) -> R {
        f(&mut self.lock_coupon())
    }

    pub fn coupon(&self) -> CouponSelection {
        self.lock_coupon().clone()
    }

    /// Totals of the current cart with the selected coupon applied.
    pub fn summary(&self) -> CartSummary {
        let coupon = self.coupon();
        self.store.summary_with(&coupon)
    }

    fn lock_coupon(&self) -> MutexGuard<'_, CouponSelection> {
        self.coupon.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
