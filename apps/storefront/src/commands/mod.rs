//! # Commands Module
//!
//! Plain functions behind every storefront action. Each takes only the
//! state it needs and returns `Result<T, ApiError>`; `server.rs` maps them
//! onto HTTP routes.
//!
//! ## Command Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Storefront Commands                                  │
//! │                                                                         │
//! │  CART (cart.rs)            COUPON (coupon.rs)     CATALOG (catalog.rs)  │
//! │  ├── get_cart              ├── list_coupons       ├── list_products     │
//! │  ├── add_to_cart           ├── apply_coupon       ├── list_categories   │
//! │  ├── increment_item        └── clear_coupon       └── product_image_url │
//! │  ├── decrement_item                                                     │
//! │  ├── remove_from_cart      ADMIN (admin.rs, session required)           │
//! │  └── clear_cart            ├── admin_login / admin_logout               │
//! │                            ├── create_product / delete_product          │
//! │                            ├── create_category / create_coupon          │
//! │                            ├── list_orders / dashboard_overview         │
//! │                            └── change_password                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod coupon;

use chrono::NaiveDate;

/// The shop's calendar date, used for coupon expiry.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
