//! # Coupon Evaluation
//!
//! Turns a cart subtotal and an optional coupon into a discount breakdown,
//! and tracks which coupon the shopper has selected.
//!
//! ## Selection State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            select(active coupon)          select(other active coupon)   │
//! │   ┌──────────┐ ─────────────────► ┌──────────────┐ ───────┐             │
//! │   │ NoCoupon │                    │   Selected   │        │ replaces    │
//! │   └──────────┘ ◄───────────────── └──────────────┘ ◄──────┘             │
//! │        ▲             clear()             │                              │
//! │        │                                 │ select(expired / unknown)    │
//! │        │ select(expired / unknown)       ▼                              │
//! │        └── InvalidCoupon, unchanged    InvalidCoupon, unchanged        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Expiry is checked only when a coupon is selected. A coupon that expires
//! while it is selected keeps applying until it is cleared.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CouponDescriptor;

// =============================================================================
// Discount Breakdown
// =============================================================================

/// Result of applying a coupon to a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiscountBreakdown {
    pub discount_percent: u8,
    pub discount_amount: Money,
    /// `max(subtotal - discount_amount, 0)`
    pub grand_total: Money,
}

impl DiscountBreakdown {
    /// Breakdown with no coupon applied.
    pub fn none(subtotal: Money) -> Self {
        DiscountBreakdown {
            discount_percent: 0,
            discount_amount: Money::zero(),
            grand_total: subtotal.floor_at_zero(),
        }
    }

    fn with_percent(subtotal: Money, percent: u8) -> Self {
        let discount_amount = subtotal.percentage_of(u32::from(percent));
        DiscountBreakdown {
            discount_percent: percent,
            discount_amount,
            grand_total: (subtotal - discount_amount).floor_at_zero(),
        }
    }
}

// =============================================================================
// Evaluate
// =============================================================================

/// Computes the discount for `subtotal` under an optional coupon.
///
/// ## Rules
/// - No coupon: zero discount, grand total = subtotal
/// - Coupon: discount = subtotal × percent / 100 (rounded half up to the paisa)
/// - Grand total never drops below zero
/// - A coupon whose expiry date is before `today` fails with `InvalidCoupon`
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use ekaksha_core::{evaluate, CouponDescriptor, Money};
///
/// let coupon = CouponDescriptor {
///     id: "c1".into(),
///     code: "SAVE10".into(),
///     discount_percent: 10,
///     expiry_date: None,
///     description: None,
/// };
/// let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
///
/// let result = evaluate(Money::from_rupees(3000), Some(&coupon), today).unwrap();
/// assert_eq!(result.discount_amount, Money::from_rupees(300));
/// assert_eq!(result.grand_total, Money::from_rupees(2700));
/// ```
pub fn evaluate(
    subtotal: Money,
    coupon: Option<&CouponDescriptor>,
    today: NaiveDate,
) -> CoreResult<DiscountBreakdown> {
    match coupon {
        None => Ok(DiscountBreakdown::none(subtotal)),
        Some(coupon) => {
            ensure_active(coupon, today)?;
            Ok(DiscountBreakdown::with_percent(
                subtotal,
                coupon.discount_percent,
            ))
        }
    }
}

fn ensure_active(coupon: &CouponDescriptor, today: NaiveDate) -> CoreResult<()> {
    if coupon.is_active(today) {
        return Ok(());
    }
    let reason = match coupon.expiry_date {
        Some(expiry) => format!("expired on {}", expiry),
        None => "expired".to_string(),
    };
    Err(CoreError::invalid_coupon(&coupon.code, reason))
}

// =============================================================================
// Coupon Selection
// =============================================================================

/// The coupon chosen for the current cart-viewing session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "coupon", rename_all = "camelCase")]
pub enum CouponSelection {
    #[default]
    NoCoupon,
    Selected(CouponDescriptor),
}

impl CouponSelection {
    /// Selects `coupon`, replacing any previous selection.
    ///
    /// An expired coupon is rejected and the selection stays as it was.
    pub fn select(
        &mut self,
        coupon: CouponDescriptor,
        today: NaiveDate,
    ) -> CoreResult<()> {
        ensure_active(&coupon, today)?;
        *self = CouponSelection::Selected(coupon);
        Ok(())
    }

    /// Looks `code` up in `directory` (case-insensitive) and selects it.
    ///
    /// Unknown codes fail with `InvalidCoupon`, same as expired ones.
    pub fn select_by_code(
        &mut self,
        code: &str,
        directory: &[CouponDescriptor],
        today: NaiveDate,
    ) -> CoreResult<()> {
        let code = code.trim();
        let coupon = directory
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .cloned()
            .ok_or_else(|| CoreError::invalid_coupon(code, "unknown coupon code"))?;
        self.select(coupon, today)
    }

    /// Drops the current selection.
    pub fn clear(&mut self) {
        *self = CouponSelection::NoCoupon;
    }

    pub fn selected(&self) -> Option<&CouponDescriptor> {
        match self {
            CouponSelection::Selected(c) => Some(c),
            CouponSelection::NoCoupon => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.selected().map(|c| c.code.as_str())
    }

    pub fn is_selected(&self) -> bool {
        matches!(self, CouponSelection::Selected(_))
    }

    /// Applies the selected coupon to `subtotal` without re-checking expiry.
    pub fn apply(&self, subtotal: Money) -> DiscountBreakdown {
        match self {
            CouponSelection::Selected(c) => {
                DiscountBreakdown::with_percent(subtotal, c.discount_percent)
            }
            CouponSelection::NoCoupon => DiscountBreakdown::none(subtotal),
        }
    }
}
