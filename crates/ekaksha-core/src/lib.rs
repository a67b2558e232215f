//! # ekaksha-core: Pure Business Logic for the Ekaksha storefront
//!
//! This crate holds the cart arithmetic, coupon evaluation and catalog
//! filtering of the storefront as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Ekaksha Storefront Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Frontend                                 │   │
//! │  │    Catalog ──► Cart ──► Coupon ──► Checkout   |   Admin screens │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / WebSocket                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/storefront                              │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │                    │
//! │  ┌──────────────▼───────────────┐   ┌──────────────▼───────────────┐   │
//! │  │ ekaksha-store                │   │ ekaksha-db                   │   │
//! │  │ persisted cart + session     │   │ catalog, coupons, orders     │   │
//! │  └──────────────┬───────────────┘   └──────────────┬───────────────┘   │
//! │                 └──────────────┬───────────────────┘                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ ekaksha-core (THIS CRATE) ★                     │   │
//! │  │   types • money • cart • coupon • catalog • validation         │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Order, CouponDescriptor, ...)
//! - [`money`] - Money type with integer arithmetic (paise, no floating point)
//! - [`cart`] - Cart lines, cart mutations and derived totals
//! - [`coupon`] - Coupon evaluation and the coupon selection state machine
//! - [`catalog`] - Client-side catalog filtering
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use ekaksha_core::{Cart, CartLine, Money};
//!
//! let mut cart = Cart::new();
//! let line = CartLine::new("tee-1", "Cotton Tee", 2, Money::from_rupees(1000));
//! cart.add(line, 3).unwrap();
//!
//! let summary = cart.summary();
//! assert_eq!(summary.total_items, 6);
//! assert_eq!(summary.subtotal, Money::from_rupees(3000));
//! ```

pub mod cart;
pub mod catalog;
pub mod coupon;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartSummary};
pub use catalog::CatalogFilter;
pub use coupon::{evaluate, CouponSelection, DiscountBreakdown};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Bucket holding product images in the object store.
pub const IMAGE_BUCKET: &str = "outfit_images";

/// Highest offer price a product may carry: ₹1,00,00,000 (one crore) in paise.
pub const MAX_OFFER_PRICE_PAISE: i64 = 1_000_000_000;

/// Highest discount a coupon may carry, in percent.
pub const MAX_DISCOUNT_PERCENT: u8 = 100;

/// Minimum length of an admin password set from the settings screen.
pub const MIN_PASSWORD_LEN: usize = 6;
