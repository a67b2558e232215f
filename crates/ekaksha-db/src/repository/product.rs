//! # Product Repository
//!
//! The Catalog Service's product side: listing for the storefront,
//! admin inserts and deletes.
//!
//! ## Adding a Product With an Image
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert_with_image(new, objects, bucket, "kurta.png", bytes)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  key = "1717171717171_kurta.png"                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  upload_object(bucket, key, bytes)                                      │
//! │       │                                                                 │
//! │       ├── failed? ──► return error, no row written                      │
//! │       ▼                                                                 │
//! │  INSERT INTO products (..., image_key = key)                            │
//! │       │                                                                 │
//! │       └── failed? ──► delete the uploaded object, return error          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use ekaksha_core::validation::{
    validate_category_name, validate_offer_price, validate_offer_quantity, validate_product_name,
};
use ekaksha_core::{join_sizes, split_sizes, Money, Product, Size, StockStatus, ValidationError};
use serde::{Deserialize, Serialize};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use super::column_u32;
use crate::error::{DbError, DbResult};
use crate::objects::ObjectStore;

const PRODUCT_COLUMNS: &str = "id, name, offer_quantity, offer_price_paise, sizes, category, \
                               description, stock_status, image_key, created_at";

// =============================================================================
// Query / Input Types
// =============================================================================

/// Storefront listing parameters.
///
/// An absent category, or the category "All", lists every product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("All"))
    }
}

/// A product as submitted from the admin form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub offer_quantity: u32,
    pub offer_price: Money,
    pub sizes: Vec<Size>,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stock_status: StockStatus,
}

impl NewProduct {
    /// Same checks the admin form enforces: a name, a positive bundle, at
    /// least one size and a category.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_product_name(&self.name)?;
        validate_offer_quantity(self.offer_quantity)?;
        validate_offer_price(self.offer_price)?;
        if self.sizes.is_empty() {
            return Err(ValidationError::Required {
                field: "sizes".to_string(),
            });
        }
        validate_category_name(&self.category)?;
        Ok(())
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    offer_quantity: i64,
    offer_price_paise: i64,
    sizes: String,
    category: String,
    description: Option<String>,
    stock_status: StockStatus,
    image_key: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DbError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            offer_quantity: column_u32("offer_quantity", row.offer_quantity)?,
            offer_price: Money::from_paise(row.offer_price_paise),
            sizes: split_sizes(&row.sizes)?,
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            stock_status: row.stock_status,
            image_key: row.image_key,
            created_at: row.created_at,
        })
    }
}

fn into_products(rows: Vec<ProductRow>) -> DbResult<Vec<Product>> {
    rows.into_iter().map(Product::try_from).collect()
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products newest first, optionally narrowed to one category.
    ///
    /// Category matching ignores case.
    pub async fn list(&self, query: &ProductQuery) -> DbResult<Vec<Product>> {
        debug!(category = ?query.category, limit = ?query.limit, "Listing products");

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));

        if let Some(category) = query.category_filter() {
            builder
                .push(" WHERE category = ")
                .push_bind(category.to_string())
                .push(" COLLATE NOCASE");
        }

        builder.push(" ORDER BY created_at DESC, rowid DESC");

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        into_products(rows)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        debug!(id = %id, "Getting product by ID");

        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE id = ?",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Inserts a product without an image, stamped with the current time.
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        self.insert_at(new, None, Utc::now()).await
    }

    /// Inserts a product with an explicit image key and creation time.
    pub async fn insert_at(
        &self,
        new: &NewProduct,
        image_key: Option<String>,
        created_at: DateTime<Utc>,
    ) -> DbResult<Product> {
        new.validate()?;

        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            offer_quantity: new.offer_quantity,
            offer_price: new.offer_price,
            sizes: new.sizes.clone(),
            category: new.category.trim().to_string(),
            description: new.description.clone().filter(|d| !d.trim().is_empty()),
            stock_status: new.stock_status,
            image_key,
            created_at,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, offer_quantity, offer_price_paise, sizes, category,
                description, stock_status, image_key, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(i64::from(product.offer_quantity))
        .bind(product.offer_price.paise())
        .bind(join_sizes(&product.sizes))
        .bind(&product.category)
        .bind(&product.description)
        .bind(product.stock_status)
        .bind(&product.image_key)
        .bind(product.created_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Uploads the image, then inserts the product pointing at it.
    ///
    /// A failed upload writes nothing. A failed insert removes the uploaded
    /// object again before returning the insert error.
    pub async fn insert_with_image(
        &self,
        new: &NewProduct,
        objects: &ObjectStore,
        bucket: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> DbResult<Product> {
        new.validate()?;

        let now = Utc::now();
        let key = ObjectStore::object_key_for(file_name, now);
        let key = objects.upload_object(bucket, &key, bytes).await?;

        match self.insert_at(new, Some(key.clone()), now).await {
            Ok(product) => Ok(product),
            Err(e) => {
                if let Err(cleanup) = objects.delete_object(bucket, &key).await {
                    warn!(key = %key, error = %cleanup, "Orphaned product image after failed insert");
                }
                Err(e)
            }
        }
    }

    /// Deletes a product. Returns the removed product so callers can drop
    /// its image.
    pub async fn delete(&self, id: &str) -> DbResult<Product> {
        debug!(id = %id, "Deleting product");

        let product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(product)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
