//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │ CouponDescriptor│   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  code (unique)  │   │  id (UUID)      │       │
//! │  │  offer_quantity │   │  discount %     │   │  customer_name  │       │
//! │  │  offer_price    │   │  expiry_date    │   │  total_amount   │       │
//! │  │  sizes, category│   │  description    │   │  status         │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Size       │   │  StockStatus    │   │  AdminSession   │       │
//! │  │  S M L XL XXL   │   │  In Stock       │   │  id, email,     │       │
//! │  │                 │   │  Out of Stock   │   │  role, login at │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Offers
//! Products are sold in offer bundles: "2 shirts for ₹1000" is a product
//! with `offer_quantity = 2` and `offer_price = ₹1000`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Size
// =============================================================================

/// Garment size offered for a product.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Size {
    S,
    M,
    L,
    XL,
    XXL,
}

impl Size {
    /// All sizes in display order.
    pub const ALL: [Size; 5] = [Size::S, Size::M, Size::L, Size::XL, Size::XXL];

    /// Returns the label used on the wire and in the catalog table.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::XL => "XL",
            Size::XXL => "XXL",
        }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Size {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "S" => Ok(Size::S),
            "M" => Ok(Size::M),
            "L" => Ok(Size::L),
            "XL" => Ok(Size::XL),
            "XXL" => Ok(Size::XXL),
            other => Err(ValidationError::InvalidFormat {
                field: "size".to_string(),
                reason: format!("unknown size '{}'", other),
            }),
        }
    }
}

/// Joins sizes into the comma-separated column format of the catalog table.
///
/// ```rust
/// use ekaksha_core::{join_sizes, Size};
///
/// assert_eq!(join_sizes(&[Size::M, Size::XL]), "M,XL");
/// ```
pub fn join_sizes(sizes: &[Size]) -> String {
    sizes
        .iter()
        .map(Size::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Splits a comma-separated size column back into typed sizes.
///
/// Empty segments are skipped, duplicates are dropped, order is preserved.
pub fn split_sizes(raw: &str) -> Result<Vec<Size>, ValidationError> {
    let mut sizes = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let size: Size = part.parse()?;
        if !sizes.contains(&size) {
            sizes.push(size);
        }
    }
    Ok(sizes)
}

// =============================================================================
// Stock Status
// =============================================================================

/// Whether a product can currently be ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[ts(export)]
pub enum StockStatus {
    #[default]
    #[serde(rename = "In Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "In Stock"))]
    InStock,
    #[serde(rename = "Out of Stock")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "Out of Stock"))]
    OutOfStock,
}

// =============================================================================
// Product
// =============================================================================

/// A product listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Number of physical items in one offer bundle.
    pub offer_quantity: u32,

    /// Price charged per offer bundle.
    pub offer_price: Money,

    /// Sizes the product is available in.
    pub sizes: Vec<Size>,

    /// Category name (e.g., "Men", "Women", "Kids").
    pub category: String,

    /// Optional description.
    pub description: Option<String>,

    pub stock_status: StockStatus,

    /// Object key of the product image in [`crate::IMAGE_BUCKET`].
    pub image_key: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Checks if the product can be added to a cart.
    pub fn is_available(&self) -> bool {
        self.stock_status == StockStatus::InStock
    }
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

/// A placed order as listed in the admin back-office.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub total_items: u32,
    pub total_amount: Money,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Short reference shown in the orders table (first 8 characters of the id).
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}

// =============================================================================
// Coupons
// =============================================================================

/// A discount coupon from the coupon directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CouponDescriptor {
    pub id: String,

    /// Code the shopper types or picks (unique).
    pub code: String,

    /// Percentage off the subtotal, 0-100.
    pub discount_percent: u8,

    /// Last day the coupon can be applied; `None` never expires.
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,

    pub description: Option<String>,
}

impl CouponDescriptor {
    /// A coupon is active unless its expiry date lies before `today`.
    ///
    /// A coupon expiring today is still active for the whole day.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        match self.expiry_date {
            Some(expiry) => expiry >= today,
            None => true,
        }
    }
}

// =============================================================================
// Admin Session
// =============================================================================

/// The authenticated admin, as kept by the session gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminSession {
    pub id: String,
    pub email: String,
    pub role: String,
    #[ts(as = "String")]
    pub last_login: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(expiry: Option<NaiveDate>) -> CouponDescriptor {
        CouponDescriptor {
            id: "c1".to_string(),
            code: "SAVE10".to_string(),
            discount_percent: 10,
            expiry_date: expiry,
            description: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_size_parsing() {
        assert_eq!("xl".parse::<Size>().unwrap(), Size::XL);
        assert_eq!(" S ".parse::<Size>().unwrap(), Size::S);
        assert!("XXXL".parse::<Size>().is_err());
    }

    #[test]
    fn test_sizes_join_and_split() {
        assert_eq!(join_sizes(&[Size::S, Size::XXL]), "S,XXL");
        assert_eq!(join_sizes(&[]), "");
        assert_eq!(split_sizes("M, L,,M").unwrap(), vec![Size::M, Size::L]);
        assert!(split_sizes("").unwrap().is_empty());
        assert!(split_sizes("M,huge").is_err());
    }

    #[test]
    fn test_stock_status_wire_format() {
        let json = serde_json::to_string(&StockStatus::OutOfStock).unwrap();
        assert_eq!(json, "\"Out of Stock\"");
        assert_eq!(StockStatus::default(), StockStatus::InStock);
    }

    #[test]
    fn test_coupon_is_active() {
        let today = date(2026, 10, 18);
        assert!(coupon(None).is_active(today));
        assert!(coupon(Some(date(2026, 10, 18))).is_active(today));
        assert!(coupon(Some(date(2027, 1, 1))).is_active(today));
        assert!(!coupon(Some(date(2026, 10, 17))).is_active(today));
    }

    #[test]
    fn test_order_short_id() {
        let order = Order {
            id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            customer_name: "Asha".to_string(),
            total_items: 2,
            total_amount: Money::from_rupees(1000),
            status: OrderStatus::Paid,
            created_at: Utc::now(),
        };
        assert_eq!(order.short_id(), "550e8400");
    }
}
