//! # Admin Commands
//!
//! Back-office screens: login, catalog upkeep, coupons, orders, dashboard.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  admin_login ──► AdminRepository::verify_credentials                    │
//! │                      │ ok                                               │
//! │                      ▼                                                  │
//! │                SessionStore::login  ("adminSession" in storage)         │
//! │                                                                         │
//! │  every other command                                                    │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  SessionState::require_admin ── none ──► UNAUTHORIZED                   │
//! │      │                                                                  │
//! │      ▼                                                                  │
//! │  repository call                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ekaksha_core::validation::{
    validate_category_name, validate_new_password, validate_object_key, validate_uuid,
};
use ekaksha_core::{AdminSession, Category, CouponDescriptor, Money, Order};
use ekaksha_db::{DbError, NewCoupon, NewProduct, ProductQuery};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::commands::catalog::ProductView;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::state::{DbState, ObjectState, SessionState};

/// Orders shown on the dashboard.
const DASHBOARD_RECENT_ORDERS: u32 = 6;

/// Newest products shown on the dashboard.
const DASHBOARD_NEWEST_PRODUCTS: u32 = 5;

/// An image attached to a new product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub product_count: i64,
    pub category_count: i64,
    pub order_count: i64,
    pub revenue: Money,
    pub recent_orders: Vec<Order>,
    pub newest_products: Vec<ProductView>,
}

// =============================================================================
// Session
// =============================================================================

/// Checks credentials and stores the admin session.
pub async fn admin_login(
    db: &DbState,
    session: &SessionState,
    email: &str,
    password: &str,
) -> ApiResult<AdminSession> {
    debug!(email = %email, "admin_login command");

    let admin = db
        .inner()
        .admins()
        .verify_credentials(email, password)
        .await?
        .ok_or_else(|| ApiError::new(ErrorCode::Unauthorized, "Invalid email or password"))?;

    session.store().login(admin.clone())?;
    Ok(admin)
}

/// Ends the session in every open admin page.
pub fn admin_logout(session: &SessionState) -> ApiResult<()> {
    debug!("admin_logout command");
    session.store().logout()?;
    Ok(())
}

pub async fn change_password(
    db: &DbState,
    session: &SessionState,
    new_password: &str,
    confirm_password: &str,
) -> ApiResult<()> {
    let admin = session.require_admin()?;
    debug!(email = %admin.email, "change_password command");

    validate_new_password(new_password, confirm_password)
        .map_err(|e| ApiError::validation(e.to_string()))?;
    db.inner()
        .admins()
        .update_password(&admin.email, new_password)
        .await?;
    Ok(())
}

// =============================================================================
// Catalog Upkeep
// =============================================================================

/// Adds a product, uploading its image first when one is attached.
pub async fn create_product(
    db: &DbState,
    objects: &ObjectState,
    session: &SessionState,
    product: NewProduct,
    image: Option<ImageUpload>,
) -> ApiResult<ProductView> {
    session.require_admin()?;
    debug!(name = %product.name, has_image = image.is_some(), "create_product command");

    let repo = db.inner().products();
    let created = match image {
        Some(upload) => {
            validate_object_key(&upload.file_name)
                .map_err(|e| ApiError::validation(e.to_string()))?;
            repo.insert_with_image(
                &product,
                objects.store(),
                objects.bucket(),
                &upload.file_name,
                &upload.data,
            )
            .await?
        }
        None => repo.insert(&product).await?,
    };

    info!(id = %created.id, name = %created.name, "Product created");
    Ok(ProductView::new(created, objects))
}

/// Deletes a product and, best effort, its image.
pub async fn delete_product(
    db: &DbState,
    objects: &ObjectState,
    session: &SessionState,
    product_id: &str,
) -> ApiResult<()> {
    session.require_admin()?;
    debug!(product_id = %product_id, "delete_product command");
    validate_uuid(product_id).map_err(|e| ApiError::validation(e.to_string()))?;

    let removed = db.inner().products().delete(product_id).await?;
    if let Some(key) = removed.image_key.as_deref() {
        if let Err(e) = objects.store().delete_object(objects.bucket(), key).await {
            warn!(key = %key, error = %e, "Product deleted but its image was left behind");
        }
    }

    info!(id = %removed.id, "Product deleted");
    Ok(())
}

pub async fn create_category(
    db: &DbState,
    session: &SessionState,
    name: &str,
    description: Option<&str>,
) -> ApiResult<Category> {
    session.require_admin()?;
    debug!(name = %name, "create_category command");
    validate_category_name(name).map_err(|e| ApiError::validation(e.to_string()))?;
    Ok(db.inner().categories().insert(name, description).await?)
}

pub async fn create_coupon(
    db: &DbState,
    session: &SessionState,
    coupon: NewCoupon,
) -> ApiResult<CouponDescriptor> {
    session.require_admin()?;
    debug!(code = %coupon.code, "create_coupon command");
    let created = db.inner().coupons().insert(&coupon).await?;
    info!(code = %created.code, percent = created.discount_percent, "Coupon created");
    Ok(created)
}

// =============================================================================
// Orders & Dashboard
// =============================================================================

/// Most recent orders first; `None` lists every order.
pub async fn list_orders(
    db: &DbState,
    session: &SessionState,
    limit: Option<u32>,
) -> ApiResult<Vec<Order>> {
    session.require_admin()?;
    debug!(?limit, "list_orders command");
    db.inner()
        .orders()
        .list_recent(limit)
        .await
        .map_err(|e| ApiError::upstream("orders", e))
}

pub async fn dashboard_overview(
    db: &DbState,
    objects: &ObjectState,
    session: &SessionState,
) -> ApiResult<DashboardOverview> {
    session.require_admin()?;
    debug!("dashboard_overview command");

    let db = db.inner();
    let load = |e: DbError| ApiError::upstream("dashboard", e);

    let newest = db
        .products()
        .list(&ProductQuery::new().limit(DASHBOARD_NEWEST_PRODUCTS))
        .await
        .map_err(load)?;

    Ok(DashboardOverview {
        product_count: db.products().count().await.map_err(load)?,
        category_count: db.categories().count().await.map_err(load)?,
        order_count: db.orders().count().await.map_err(load)?,
        revenue: db.orders().revenue().await.map_err(load)?,
        recent_orders: db
            .orders()
            .list_recent(Some(DASHBOARD_RECENT_ORDERS))
            .await
            .map_err(load)?,
        newest_products: newest
            .into_iter()
            .map(|p| ProductView::new(p, objects))
            .collect(),
    })
}
