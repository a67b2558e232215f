//! # Coupon Commands
//!
//! ```text
//! list_coupons ──► CouponRepository::list_active(today) ──► offer strip
//!
//! apply_coupon("diwali25")
//!      │
//!      ├── directory lookup (case-insensitive) ── none ──► INVALID_COUPON
//!      │
//!      ├── CouponSelection::select(coupon, today) ── expired ──► INVALID_COUPON
//!      │                                                        (selection unchanged)
//!      ▼
//!   Selected(coupon) ──► CartResponse with discount applied
//! ```
//!
//! Expiry is checked when a coupon is selected. A coupon that expires while
//! it is selected keeps applying until it is cleared or replaced.

use chrono::NaiveDate;
use ekaksha_core::{CoreError, CouponDescriptor};
use tracing::{debug, info};

use crate::commands::cart::CartResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::{CartState, DbState};

/// Coupons that can still be applied on `today`.
pub async fn list_coupons(db: &DbState, today: NaiveDate) -> ApiResult<Vec<CouponDescriptor>> {
    debug!(today = %today, "list_coupons command");
    db.inner()
        .coupons()
        .list_active(today)
        .await
        .map_err(|e| ApiError::upstream("coupons", e))
}

/// Selects the coupon with `code`, replacing any current selection.
pub async fn apply_coupon(
    db: &DbState,
    cart: &CartState,
    code: &str,
    today: NaiveDate,
) -> ApiResult<CartResponse> {
    let code = code.trim();
    debug!(code = %code, "apply_coupon command");

    if code.is_empty() {
        return Err(ApiError::validation("Coupon code is required"));
    }

    let coupon = db
        .inner()
        .coupons()
        .get_by_code(code)
        .await
        .map_err(|e| ApiError::upstream("coupons", e))?
        .ok_or_else(|| CoreError::invalid_coupon(code, "unknown coupon code"))?;

    let applied = coupon.code.clone();
    cart.with_coupon(|selection| selection.select(coupon, today))?;

    info!(code = %applied, "Coupon applied");
    Ok(CartResponse::from_state(cart))
}

pub fn clear_coupon(cart: &CartState) -> CartResponse {
    debug!("clear_coupon command");
    cart.with_coupon(|selection| selection.clear());
    CartResponse::from_state(cart)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::state::testing::test_state;
    use ekaksha_core::{CartLine, Money};
    use ekaksha_db::NewCoupon;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn seed_coupons(db: &DbState) {
        for (code, percent, expiry) in [
            ("SAVE10", 10, None),
            ("DIWALI25", 25, Some(date(2026, 11, 10))),
            ("OLD50", 50, Some(date(2025, 1, 1))),
        ] {
            db.inner()
                .coupons()
                .insert(&NewCoupon {
                    code: code.to_string(),
                    discount_percent: percent,
                    expiry_date: expiry,
                    description: None,
                })
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_list_only_active() {
        let (state, _storage, _dir) = test_state().await;
        seed_coupons(&state.db).await;

        let coupons = list_coupons(&state.db, date(2026, 10, 18)).await.unwrap();
        let codes: Vec<_> = coupons.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["DIWALI25", "SAVE10"]);
    }

    #[tokio::test]
    async fn test_apply_replace_and_clear() {
        let (state, _storage, _dir) = test_state().await;
        seed_coupons(&state.db).await;
        state
            .cart
            .store()
            .add_item(CartLine::new("tee-1", "Cotton Tee", 2, Money::from_rupees(1000)), 1)
            .unwrap();
        let today = date(2026, 10, 18);

        let response = apply_coupon(&state.db, &state.cart, "save10", today).await.unwrap();
        assert_eq!(response.summary.coupon_code.as_deref(), Some("SAVE10"));
        assert_eq!(response.summary.discount_amount, Money::from_rupees(100));
        assert_eq!(response.summary.grand_total, Money::from_rupees(900));

        let response = apply_coupon(&state.db, &state.cart, "DIWALI25", today).await.unwrap();
        assert_eq!(response.summary.discount_percent, 25);
        assert_eq!(response.summary.grand_total, Money::from_rupees(750));

        let response = clear_coupon(&state.cart);
        assert_eq!(response.summary.coupon_code, None);
        assert_eq!(response.summary.grand_total, Money::from_rupees(1000));
    }

    #[tokio::test]
    async fn test_invalid_coupons_leave_selection_unchanged() {
        let (state, _storage, _dir) = test_state().await;
        seed_coupons(&state.db).await;
        let today = date(2026, 10, 18);
        apply_coupon(&state.db, &state.cart, "SAVE10", today).await.unwrap();

        let err = apply_coupon(&state.db, &state.cart, "OLD50", today).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoupon);

        let err = apply_coupon(&state.db, &state.cart, "NOPE", today).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCoupon);

        let err = apply_coupon(&state.db, &state.cart, "  ", today).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(state.cart.coupon().code(), Some("SAVE10"));
    }
}
