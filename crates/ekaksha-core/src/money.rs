//! # Money Module
//!
//! Provides the `Money` type for handling rupee amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A 10% coupon on ₹999.99 must give the same paise every time.          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Paise                                            │
//! │    ₹1000.00 = 100000 paise                                              │
//! │    Every subtotal, discount and grand total is an exact integer.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ekaksha_core::money::Money;
//!
//! let offer_price = Money::from_rupees(1000);    // ₹1000.00
//! let line_total = offer_price.multiply_quantity(3);
//! assert_eq!(line_total, Money::from_rupees(3000));
//!
//! let discount = line_total.percentage_of(10);
//! assert_eq!(discount, Money::from_rupees(300));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in paise (1/100 of a rupee).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction can go below zero before flooring
/// - **Single field tuple struct**: serializes as a bare integer
///
/// ## Where Money is Used
/// ```text
/// Product.offer_price ──► CartLine.unit_offer_price ──► line_total_price
///                                                              │
///                           CartSummary.subtotal ◄─────────────┘
///                                   │
///                     coupon::evaluate ──► discount_amount, grand_total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from paise (the smallest currency unit).
    #[inline]
    pub const fn from_paise(paise: i64) -> Self {
        Money(paise)
    }

    /// Creates a Money value from whole rupees.
    ///
    /// ## Example
    /// ```rust
    /// use ekaksha_core::money::Money;
    ///
    /// assert_eq!(Money::from_rupees(1000).paise(), 100_000);
    /// ```
    #[inline]
    pub const fn from_rupees(rupees: i64) -> Self {
        Money(rupees * 100)
    }

    /// Creates a Money value from rupees and paise.
    ///
    /// For negative amounts only the rupee part should be negative:
    /// `from_rupees_paise(-5, 50)` is -₹5.50.
    #[inline]
    pub const fn from_rupees_paise(rupees: i64, paise: i64) -> Self {
        if rupees < 0 {
            Money(rupees * 100 - paise)
        } else {
            Money(rupees * 100 + paise)
        }
    }

    /// Returns the value in paise.
    #[inline]
    pub const fn paise(&self) -> i64 {
        self.0
    }

    /// Returns the whole-rupee portion.
    #[inline]
    pub const fn rupees(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the paise portion (always 0-99).
    #[inline]
    pub const fn paise_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a count of offer bundles, saturating at the
    /// i64 bounds.
    ///
    /// ## Example
    /// ```rust
    /// use ekaksha_core::money::Money;
    ///
    /// let offer = Money::from_rupees_paise(499, 50);
    /// assert_eq!(offer.multiply_quantity(2).paise(), 99_900);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// Multiplies by a count of offer bundles, `None` if the result does not fit.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Adds two amounts, `None` if the result does not fit.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(paise) => Some(Money(paise)),
            None => None,
        }
    }

    /// Returns `percent`% of this amount, rounded half up to the paisa.
    ///
    /// ## Implementation
    /// Integer math in i128: `(paise × percent × 100 + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use ekaksha_core::money::Money;
    ///
    /// let subtotal = Money::from_rupees(3000);
    /// assert_eq!(subtotal.percentage_of(10), Money::from_rupees(300));
    ///
    /// // 15% of ₹0.05 = 0.75 paise → 1 paisa
    /// assert_eq!(Money::from_paise(5).percentage_of(15).paise(), 1);
    /// ```
    pub fn percentage_of(&self, percent: u32) -> Money {
        let bps = percent as i128 * 100;
        let amount = (self.0 as i128 * bps + 5000) / 10000;
        Money(amount as i64)
    }

    /// Clamps negative amounts to zero.
    #[inline]
    pub fn floor_at_zero(self) -> Money {
        self.max(Money::zero())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `₹1234.50`. Debug aid; the frontend does its own formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₹{}.{:02}", sign, self.rupees().abs(), self.paise_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupees_and_paise() {
        let money = Money::from_rupees_paise(10, 99);
        assert_eq!(money.paise(), 1099);
        assert_eq!(money.rupees(), 10);
        assert_eq!(money.paise_part(), 99);

        let negative = Money::from_rupees_paise(-5, 50);
        assert_eq!(negative.paise(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_paise(1099).to_string(), "₹10.99");
        assert_eq!(Money::from_rupees(1000).to_string(), "₹1000.00");
        assert_eq!(Money::from_paise(-550).to_string(), "-₹5.50");
        assert_eq!(Money::zero().to_string(), "₹0.00");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_rupees(10);
        let b = Money::from_rupees(5);
        assert_eq!((a + b).paise(), 1500);
        assert_eq!((a - b).paise(), 500);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total, Money::from_rupees(20));
    }

    #[test]
    fn test_checked_arithmetic() {
        let huge = Money::from_paise(i64::MAX / 2);
        assert_eq!(huge.checked_multiply_quantity(3), None);
        assert_eq!(huge.checked_add(huge + huge), None);
        assert_eq!(
            Money::from_rupees(10).checked_multiply_quantity(3),
            Some(Money::from_rupees(30))
        );

        // The unchecked operators saturate instead of wrapping.
        assert_eq!(huge.multiply_quantity(3).paise(), i64::MAX);
        let total: Money = vec![huge, huge, huge].into_iter().sum();
        assert_eq!(total.paise(), i64::MAX);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(Money::from_rupees(3000).percentage_of(10), Money::from_rupees(300));
        assert_eq!(Money::from_rupees(3000).percentage_of(100), Money::from_rupees(3000));
        assert_eq!(Money::from_rupees(3000).percentage_of(0), Money::zero());
        // ₹999.99 × 15% = 14999.85 paise → 15000
        assert_eq!(Money::from_paise(99_999).percentage_of(15).paise(), 15_000);
    }

    #[test]
    fn test_floor_at_zero() {
        assert_eq!(Money::from_paise(-1).floor_at_zero(), Money::zero());
        assert_eq!(Money::from_paise(42).floor_at_zero().paise(), 42);
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_rupees(12)).unwrap();
        assert_eq!(json, "1200");
        let back: Money = serde_json::from_str("1200").unwrap();
        assert_eq!(back, Money::from_rupees(12));
    }
}
