//! # Coupon Repository
//!
//! The Coupon Directory. Codes are unique ignoring case and looked up the
//! same way, so "save10" finds "SAVE10".
//!
//! Expiry filtering here only narrows what the storefront offers; the
//! evaluator in `ekaksha-core` makes the final call.

use chrono::{NaiveDate, Utc};
use ekaksha_core::validation::{validate_coupon_code, validate_discount_percent};
use ekaksha_core::{CouponDescriptor, ValidationError};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const COUPON_COLUMNS: &str = "id, code, discount_percent, expiry_date, description";

/// A coupon as created from the admin back-office.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoupon {
    pub code: String,
    pub discount_percent: u8,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCoupon {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_coupon_code(&self.code)?;
        validate_discount_percent(i64::from(self.discount_percent))?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: String,
    code: String,
    discount_percent: i64,
    expiry_date: Option<NaiveDate>,
    description: Option<String>,
}

impl TryFrom<CouponRow> for CouponDescriptor {
    type Error = DbError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        Ok(CouponDescriptor {
            discount_percent: validate_discount_percent(row.discount_percent)?,
            id: row.id,
            code: row.code,
            expiry_date: row.expiry_date,
            description: row.description,
        })
    }
}

fn into_coupons(rows: Vec<CouponRow>) -> DbResult<Vec<CouponDescriptor>> {
    rows.into_iter().map(CouponDescriptor::try_from).collect()
}

#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Every coupon, expired ones included, by code.
    pub async fn list(&self) -> DbResult<Vec<CouponDescriptor>> {
        debug!("Listing coupons");
        let rows: Vec<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons ORDER BY code",
            COUPON_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        into_coupons(rows)
    }

    /// Coupons without an expiry date or expiring on or after `today`.
    pub async fn list_active(&self, today: NaiveDate) -> DbResult<Vec<CouponDescriptor>> {
        debug!(today = %today, "Listing active coupons");
        let rows: Vec<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons \
             WHERE expiry_date IS NULL OR expiry_date >= ? \
             ORDER BY code",
            COUPON_COLUMNS
        ))
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        into_coupons(rows)
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<CouponDescriptor>> {
        let code = code.trim();
        debug!(code = %code, "Getting coupon by code");
        let row: Option<CouponRow> = sqlx::query_as(&format!(
            "SELECT {} FROM coupons WHERE code = ? COLLATE NOCASE",
            COUPON_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CouponDescriptor::try_from).transpose()
    }

    /// Creates a coupon. The code is stored upper-cased.
    pub async fn insert(&self, new: &NewCoupon) -> DbResult<CouponDescriptor> {
        new.validate()?;

        let coupon = CouponDescriptor {
            id: Uuid::new_v4().to_string(),
            code: new.code.trim().to_uppercase(),
            discount_percent: new.discount_percent,
            expiry_date: new.expiry_date,
            description: new.description.clone().filter(|d| !d.trim().is_empty()),
        };
        debug!(code = %coupon.code, percent = coupon.discount_percent, "Inserting coupon");

        sqlx::query(
            "INSERT INTO coupons (id, code, discount_percent, expiry_date, description, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&coupon.id)
        .bind(&coupon.code)
        .bind(i64::from(coupon.discount_percent))
        .bind(coupon.expiry_date)
        .bind(&coupon.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&coupon.code))?;

        Ok(coupon)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting coupon");
        let result = sqlx::query("DELETE FROM coupons WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }
        Ok(())
    }
}
