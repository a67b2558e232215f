//! # Order Repository
//!
//! Read side for the admin dashboard and orders table. Orders are only
//! written by the seed binary and tests; checkout is out of scope.

use chrono::{DateTime, Utc};
use ekaksha_core::validation::validate_product_name;
use ekaksha_core::{Money, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::column_u32;
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub customer_name: String,
    pub total_items: u32,
    pub total_amount: Money,
    #[serde(default)]
    pub status: OrderStatus,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_name: String,
    total_items: i64,
    total_amount_paise: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = DbError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            total_items: column_u32("total_items", row.total_items)?,
            total_amount: Money::from_paise(row.total_amount_paise),
            id: row.id,
            customer_name: row.customer_name,
            status: row.status,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Most recent orders first. `None` lists them all.
    pub async fn list_recent(&self, limit: Option<u32>) -> DbResult<Vec<Order>> {
        debug!(limit = ?limit, "Listing orders");
        // SQLite treats a negative LIMIT as no limit
        let limit = limit.map(i64::from).unwrap_or(-1);
        let rows: Vec<OrderRow> = sqlx::query_as(
            "SELECT id, customer_name, total_items, total_amount_paise, status, created_at \
             FROM orders ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Sum of all order totals except cancelled ones.
    pub async fn revenue(&self) -> DbResult<Money> {
        let paise: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_amount_paise), 0) FROM orders WHERE status != 'cancelled'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(Money::from_paise(paise))
    }

    pub async fn insert(&self, new: &NewOrder) -> DbResult<Order> {
        self.insert_at(new, Utc::now()).await
    }

    pub async fn insert_at(&self, new: &NewOrder, created_at: DateTime<Utc>) -> DbResult<Order> {
        validate_product_name(&new.customer_name).map_err(|_| {
            DbError::InvalidData("customer name must be 1-200 characters".to_string())
        })?;
        if new.total_amount.is_negative() {
            return Err(DbError::InvalidData("order total cannot be negative".to_string()));
        }

        let order = Order {
            id: Uuid::new_v4().to_string(),
            customer_name: new.customer_name.trim().to_string(),
            total_items: new.total_items,
            total_amount: new.total_amount,
            status: new.status,
            created_at,
        };
        debug!(id = %order.id, total = %order.total_amount, "Inserting order");

        sqlx::query(
            "INSERT INTO orders (id, customer_name, total_items, total_amount_paise, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&order.id)
        .bind(&order.customer_name)
        .bind(i64::from(order.total_items))
        .bind(order.total_amount.paise())
        .bind(order.status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    fn order(name: &str, rupees: i64, status: OrderStatus) -> NewOrder {
        NewOrder {
            customer_name: name.to_string(),
            total_items: 2,
            total_amount: Money::from_rupees(rupees),
            status,
        }
    }

    #[tokio::test]
    async fn test_recent_count_revenue() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();
        let now = Utc::now();

        assert_eq!(repo.revenue().await.unwrap(), Money::zero());

        repo.insert_at(&order("Asha", 1000, OrderStatus::Paid), now - Duration::hours(2))
            .await
            .unwrap();
        repo.insert_at(&order("Ravi", 500, OrderStatus::Cancelled), now - Duration::hours(1))
            .await
            .unwrap();
        repo.insert_at(&order("Meera", 250, OrderStatus::Pending), now)
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);
        assert_eq!(repo.revenue().await.unwrap(), Money::from_rupees(1250));

        let recent = repo.list_recent(Some(2)).await.unwrap();
        let names: Vec<_> = recent.iter().map(|o| o.customer_name.as_str()).collect();
        assert_eq!(names, vec!["Meera", "Ravi"]);

        assert_eq!(repo.list_recent(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_customer() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .orders()
            .insert(&order(" ", 100, OrderStatus::Pending))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidData(_)));
    }
}
