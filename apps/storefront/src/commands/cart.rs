//! # Cart Commands
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Coupon  │────►│ Checkout │       │
//! │  │  Cart    │     │          │     │ applied  │     │ (later)  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                                │
//! │                   add_to_cart        apply_coupon (coupon.rs)          │
//! │                   increment_item                                        │
//! │                   decrement_item                                        │
//! │                   remove_from_cart                                      │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────► (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every mutation persists the whole cart and publishes on the change bus,
//! so other open pages reload before their next render.

use ekaksha_core::{CartLine, CartSummary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::state::{CartState, DbState, ObjectState};

/// Cart response including lines and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub items: Vec<CartLine>,
    pub summary: CartSummary,
}

impl CartResponse {
    /// Lines and totals from the same snapshot.
    pub fn from_state(cart: &CartState) -> Self {
        let coupon = cart.coupon();
        let snapshot = cart.store().snapshot();
        CartResponse {
            summary: snapshot.summary_with(&coupon),
            items: snapshot.lines().to_vec(),
        }
    }
}

/// Gets the current cart contents.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  CART                                              2 lines, 7 items    │
/// ├─────────────────────────────────────────────────────────────────────────┤
/// │  Cotton Kurta (2 pcs)      ₹999.00    [-] 2 [+]      ₹1998.00   [x]    │
/// │  Linen Shirt  (3 pcs)      ₹1499.00   [-] 1 [+]      ₹1499.00   [x]    │
/// ├─────────────────────────────────────────────────────────────────────────┤
/// │  Subtotal                                            ₹3497.00          │
/// │  Coupon WELCOME10 (10%)                              -₹349.70          │
/// │  TOTAL                                               ₹3147.30          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    CartResponse::from_state(cart)
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - Product already in cart: its quantity grows by `quantity`
/// - Product not in cart: added as a new line
/// - Offer price and quantity are copied into the line when added
/// - Out-of-stock products are refused
pub async fn add_to_cart(
    db: &DbState,
    objects: &ObjectState,
    cart: &CartState,
    product_id: &str,
    quantity: Option<u32>,
) -> ApiResult<CartResponse> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = %product_id, quantity, "add_to_cart command");

    let product = db
        .inner()
        .products()
        .get_by_id(product_id)
        .await
        .map_err(|e| ApiError::upstream("product", e))?
        .ok_or_else(|| ApiError::not_found("Product", product_id))?;

    if !product.is_available() {
        return Err(ApiError::validation(format!("{} is out of stock", product.name)));
    }

    let image_url = objects.image_url(product.image_key.as_deref());
    let line = CartLine::from_product(&product, image_url);
    let new_quantity = cart.store().add_item(line, quantity)?;

    info!(product_id = %product_id, quantity = new_quantity, "Added to cart");
    Ok(CartResponse::from_state(cart))
}

/// Adds one offer bundle to an existing line.
pub fn increment_item(cart: &CartState, product_id: &str) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, "increment_item command");
    cart.store().increment(product_id)?;
    Ok(CartResponse::from_state(cart))
}

/// Removes one offer bundle; a line never drops below 1 this way.
pub fn decrement_item(cart: &CartState, product_id: &str) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, "decrement_item command");
    cart.store().decrement(product_id)?;
    Ok(CartResponse::from_state(cart))
}

pub fn remove_from_cart(cart: &CartState, product_id: &str) -> ApiResult<CartResponse> {
    debug!(product_id = %product_id, "remove_from_cart command");
    let removed = cart.store().remove_item(product_id)?;
    info!(product_id = %removed.product_id, "Removed from cart");
    Ok(CartResponse::from_state(cart))
}

/// Empties the cart. The selected coupon stays selected.
pub fn clear_cart(cart: &CartState) -> ApiResult<CartResponse> {
    debug!("clear_cart command");
    cart.store().clear()?;
    Ok(CartResponse::from_state(cart))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::testing::test_state;
    use ekaksha_core::{Money, Size, StockStatus};
    use ekaksha_db::NewProduct;
    use ekaksha_store::CART_KEY;
    use ekaksha_store::KeyValueStorage;

    fn kurta(stock_status: StockStatus) -> NewProduct {
        NewProduct {
            name: "Cotton Kurta".to_string(),
            offer_quantity: 2,
            offer_price: Money::from_rupees(999),
            sizes: vec![Size::M, Size::L],
            category: "Men".to_string(),
            description: None,
            stock_status,
        }
    }

    #[tokio::test]
    async fn test_add_merges_and_persists() {
        let (state, storage, _dir) = test_state().await;
        let product = state
            .db
            .inner()
            .products()
            .insert(&kurta(StockStatus::InStock))
            .await
            .unwrap();

        add_to_cart(&state.db, &state.objects, &state.cart, &product.id, None)
            .await
            .unwrap();
        let response = add_to_cart(&state.db, &state.objects, &state.cart, &product.id, Some(2))
            .await
            .unwrap();

        assert_eq!(response.items.len(), 1);
        assert_eq!(response.items[0].quantity_in_cart, 3);
        assert_eq!(response.summary.total_items, 6);
        assert_eq!(response.summary.subtotal, Money::from_rupees(2997));

        let raw = storage.get(CART_KEY).unwrap().unwrap();
        assert!(raw.contains("\"quantityInCart\":3"));
    }

    #[tokio::test]
    async fn test_add_rejects_missing_and_out_of_stock() {
        let (state, _storage, _dir) = test_state().await;

        let err = add_to_cart(&state.db, &state.objects, &state.cart, "missing", None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let sold_out = state
            .db
            .inner()
            .products()
            .insert(&kurta(StockStatus::OutOfStock))
            .await
            .unwrap();
        let err = add_to_cart(&state.db, &state.objects, &state.cart, &sold_out.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(get_cart(&state.cart).items.is_empty());
    }

    #[tokio::test]
    async fn test_line_commands() {
        let (state, _storage, _dir) = test_state().await;
        let product = state
            .db
            .inner()
            .products()
            .insert(&kurta(StockStatus::InStock))
            .await
            .unwrap();
        add_to_cart(&state.db, &state.objects, &state.cart, &product.id, None)
            .await
            .unwrap();

        let response = increment_item(&state.cart, &product.id).unwrap();
        assert_eq!(response.items[0].quantity_in_cart, 2);

        decrement_item(&state.cart, &product.id).unwrap();
        let response = decrement_item(&state.cart, &product.id).unwrap();
        assert_eq!(response.items[0].quantity_in_cart, 1);

        let err = increment_item(&state.cart, "ghost").unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let response = remove_from_cart(&state.cart, &product.id).unwrap();
        assert!(response.items.is_empty());
        assert_eq!(response.summary.grand_total, Money::zero());
    }

    #[tokio::test]
    async fn test_write_failure_reports_persistence_error() {
        let (state, storage, _dir) = test_state().await;
        let product = state
            .db
            .inner()
            .products()
            .insert(&kurta(StockStatus::InStock))
            .await
            .unwrap();

        storage.set_disabled(true);
        let err = add_to_cart(&state.db, &state.objects, &state.cart, &product.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PersistenceError);

        // The page still sees the line it just added.
        assert_eq!(get_cart(&state.cart).items.len(), 1);

        storage.set_disabled(false);
        clear_cart(&state.cart).unwrap();
        assert!(get_cart(&state.cart).items.is_empty());
    }
}
