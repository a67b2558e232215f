//! # Repository Layer
//!
//! One repository per table. Each holds a pool clone and converts rows into
//! `ekaksha-core` types at the boundary.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database                                                               │
//! │   ├── products()   → ProductRepository   (Catalog Service)              │
//! │   ├── categories() → CategoryRepository  (Catalog Service)              │
//! │   ├── coupons()    → CouponRepository    (Coupon Directory)             │
//! │   ├── orders()     → OrderRepository                                    │
//! │   └── admins()     → AdminRepository     (Admin directory)              │
//! │                                                                         │
//! │  Row structs (FromRow) ──TryFrom──► core types                          │
//! │  paise columns → Money, size column → Vec<Size>                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod admin;
pub mod category;
pub mod coupon;
pub mod order;
pub mod product;

pub use admin::AdminRepository;
pub use category::CategoryRepository;
pub use coupon::{CouponRepository, NewCoupon};
pub use order::{NewOrder, OrderRepository};
pub use product::{NewProduct, ProductQuery, ProductRepository};

use crate::error::DbError;

/// Narrows a stored INTEGER into an unsigned domain field.
pub(crate) fn column_u32(field: &str, value: i64) -> Result<u32, DbError> {
    u32::try_from(value)
        .map_err(|_| DbError::InvalidData(format!("{} out of range: {}", field, value)))
}
