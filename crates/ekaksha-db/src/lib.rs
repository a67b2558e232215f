//! # ekaksha-db: Backend Collaborators for the Ekaksha Storefront
//!
//! SQLite-backed catalog, coupon directory, orders and admin directory,
//! plus disk-backed object storage for product images.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Storefront Data Flow                                │
//! │                                                                         │
//! │  storefront command (list_products, apply_coupon, admin_login, ...)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     ekaksha-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │◄───│ Product        │    │  (embedded)  │   │    │
//! │  │   │  SqlitePool   │    │ Category       │    │ 001_init.sql │   │    │
//! │  │   │               │    │ Coupon, Order  │    │              │   │    │
//! │  │   │               │    │ Admin          │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────────────────────────┐                         │    │
//! │  │   │ ObjectStore (objects.rs)          │  objects_dir/<bucket>/  │    │
//! │  │   └───────────────────────────────────┘                         │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ekaksha_db::{Database, DbConfig, ProductQuery};
//!
//! let db = Database::new(DbConfig::new("ekaksha.db")).await?;
//! let men = db.products().list(&ProductQuery::new().category("Men")).await?;
//! let coupons = db.coupons().list_active(today).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod objects;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use objects::ObjectStore;
pub use pool::{Database, DbConfig};

pub use repository::{
    AdminRepository, CategoryRepository, CouponRepository, NewCoupon, NewOrder, NewProduct,
    OrderRepository, ProductQuery, ProductRepository,
};
