//! # Cart
//!
//! The shopping cart as a pure, in-memory state machine.
//!
//! Persistence and change notification live in `ekaksha-store`; this module
//! only knows how lines are merged, counted and totalled.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add(line, n)    line exists? quantity += n : push(line, quantity = n)  │
//! │  increment(id)   quantity += 1                                          │
//! │  decrement(id)   quantity = max(quantity - 1, 1)   (never removes)      │
//! │  remove(id)      drop the line whatever its quantity                    │
//! │  clear()         drop every line                                        │
//! │                                                                         │
//! │  increment / decrement / remove on an unknown id → LineNotFound,       │
//! │  cart untouched.                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - One line per product id, in insertion order
//! - `quantity_in_cart >= 1` and `unit_offer_quantity >= 1` on every line
//! - Totals are derived on read, never stored
//! - Every line total and the subtotal fit in `Money`; `add` and
//!   `increment` refuse with `QuantityOverflow` rather than break this

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::coupon::CouponSelection;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::Product;
use crate::validation;

// =============================================================================
// Cart Line
// =============================================================================

/// One entry per distinct product in the cart.
///
/// Product data is copied into the line when it is added, so the cart keeps
/// showing the offer the shopper accepted even if the catalog changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartLine {
    /// Product id, unique within the cart.
    pub product_id: String,

    /// Physical items bundled in one offer (e.g. 2 in "2 shirts for ₹1000").
    pub unit_offer_quantity: u32,

    /// Price per offer bundle.
    pub unit_offer_price: Money,

    /// Offer bundles selected by the shopper.
    pub quantity_in_cart: u32,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
}

impl CartLine {
    /// Creates a line for one offer bundle of a product.
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        unit_offer_quantity: u32,
        unit_offer_price: Money,
    ) -> Self {
        CartLine {
            product_id: product_id.into(),
            unit_offer_quantity,
            unit_offer_price,
            quantity_in_cart: 1,
            name: name.into(),
            description: None,
            image_url: None,
        }
    }

    /// Creates a line from a catalog product and its resolved image URL.
    pub fn from_product(product: &Product, image_url: Option<String>) -> Self {
        CartLine {
            product_id: product.id.clone(),
            unit_offer_quantity: product.offer_quantity,
            unit_offer_price: product.offer_price,
            quantity_in_cart: 1,
            name: product.name.clone(),
            description: product.description.clone(),
            image_url,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    /// Physical items on this line: `unit_offer_quantity × quantity_in_cart`.
    #[inline]
    pub fn line_total_items(&self) -> u64 {
        u64::from(self.unit_offer_quantity) * u64::from(self.quantity_in_cart)
    }

    /// Price of this line: `unit_offer_price × quantity_in_cart`.
    #[inline]
    pub fn line_total_price(&self) -> Money {
        self.unit_offer_price.multiply_quantity(self.quantity_in_cart)
    }

    fn checked_line_total_price(&self) -> Option<Money> {
        self.unit_offer_price
            .checked_multiply_quantity(self.quantity_in_cart)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_offer_quantity(self.unit_offer_quantity)?;
        validation::validate_offer_price(self.unit_offer_price)?;
        validation::validate_cart_quantity(self.quantity_in_cart)?;
        Ok(())
    }
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Totals derived from the cart and the selected coupon. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSummary {
    /// Number of distinct lines.
    pub line_count: usize,

    /// Σ line_total_items
    pub total_items: u64,

    /// Σ line_total_price
    pub subtotal: Money,

    /// Code of the applied coupon, if any.
    pub coupon_code: Option<String>,

    pub discount_percent: u8,

    pub discount_amount: Money,

    /// Subtotal minus discount, floored at zero.
    pub grand_total: Money,
}

// =============================================================================
// Cart
// =============================================================================

/// Insertion-ordered set of cart lines keyed by product id.
///
/// Serializes as a bare JSON array of [`CartLine`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Builds a cart from persisted lines, checking every invariant.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, ValidationError> {
        let cart = Cart { lines };
        cart.validate()?;
        Ok(cart)
    }

    /// Adds `quantity` offer bundles of a product.
    ///
    /// ## Behavior
    /// - Product already in cart: its `quantity_in_cart` grows by `quantity`
    /// - Product not in cart: `line` is appended with `quantity_in_cart = quantity`
    ///
    /// ## Returns
    /// The line's new `quantity_in_cart`.
    pub fn add(&mut self, mut line: CartLine, quantity: u32) -> CoreResult<u32> {
        validation::validate_cart_quantity(quantity)?;

        let overflow = || CoreError::QuantityOverflow {
            product_id: line.product_id.clone(),
        };

        if let Some(index) = self.position(&line.product_id) {
            let before = self.lines[index].quantity_in_cart;
            let after = before.checked_add(quantity).ok_or_else(overflow)?;
            self.lines[index].quantity_in_cart = after;
            if self.checked_subtotal().is_none() {
                self.lines[index].quantity_in_cart = before;
                return Err(overflow());
            }
            return Ok(after);
        }

        line.quantity_in_cart = quantity;
        line.validate()?;
        let err = overflow();
        self.lines.push(line);
        if self.checked_subtotal().is_none() {
            self.lines.pop();
            return Err(err);
        }
        Ok(quantity)
    }

    /// Adds one offer bundle to an existing line.
    pub fn increment(&mut self, product_id: &str) -> CoreResult<u32> {
        let overflow = || CoreError::QuantityOverflow {
            product_id: product_id.to_string(),
        };
        let index = self
            .position(product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;

        let before = self.lines[index].quantity_in_cart;
        let after = before.checked_add(1).ok_or_else(overflow)?;
        self.lines[index].quantity_in_cart = after;
        if self.checked_subtotal().is_none() {
            self.lines[index].quantity_in_cart = before;
            return Err(overflow());
        }
        Ok(after)
    }

    /// Takes one offer bundle off a line, stopping at 1.
    ///
    /// Decrementing a line at 1 leaves it at 1; use [`Cart::remove`] to drop it.
    pub fn decrement(&mut self, product_id: &str) -> CoreResult<u32> {
        let line = self
            .line_mut(product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;

        line.quantity_in_cart = line.quantity_in_cart.saturating_sub(1).max(1);
        Ok(line.quantity_in_cart)
    }

    /// Removes a line regardless of its quantity.
    pub fn remove(&mut self, product_id: &str) -> CoreResult<CartLine> {
        let index = self
            .position(product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;
        Ok(self.lines.remove(index))
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &str) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }

    /// Returns the number of distinct lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ line_total_items over all lines.
    pub fn total_items(&self) -> u64 {
        self.lines
            .iter()
            .map(CartLine::line_total_items)
            .fold(0, u64::saturating_add)
    }

    /// Σ line_total_price over all lines.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total_price).sum()
    }

    fn checked_subtotal(&self) -> Option<Money> {
        self.lines.iter().try_fold(Money::zero(), |acc, line| {
            acc.checked_add(line.checked_line_total_price()?)
        })
    }

    /// Totals without a coupon.
    pub fn summary(&self) -> CartSummary {
        self.summary_with(&CouponSelection::NoCoupon)
    }

    /// Totals with the currently selected coupon applied.
    ///
    /// Expiry was checked when the coupon was selected; it is not re-checked
    /// here.
    pub fn summary_with(&self, selection: &CouponSelection) -> CartSummary {
        let subtotal = self.subtotal();
        let breakdown = selection.apply(subtotal);

        CartSummary {
            line_count: self.len(),
            total_items: self.total_items(),
            subtotal,
            coupon_code: selection.code().map(str::to_string),
            discount_percent: breakdown.discount_percent,
            discount_amount: breakdown.discount_amount,
            grand_total: breakdown.grand_total,
        }
    }

    /// Checks the cart invariants.
    ///
    /// Used on persisted data: a cart that fails here is treated as malformed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.lines.len());
        for line in &self.lines {
            if line.product_id.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "productId".to_string(),
                });
            }
            if !seen.insert(line.product_id.as_str()) {
                return Err(ValidationError::InvalidFormat {
                    field: "productId".to_string(),
                    reason: format!("duplicate line for {}", line.product_id),
                });
            }
            line.validate()?;
        }
        if self.checked_subtotal().is_none() {
            return Err(ValidationError::InvalidFormat {
                field: "subtotal".to_string(),
                reason: "cart total is too large".to_string(),
            });
        }
        Ok(())
    }
}
