//! # Category Repository
//!
//! Category names are unique regardless of case ("Men" and "men" collide).

use chrono::Utc;
use ekaksha_core::validation::validate_category_name;
use ekaksha_core::Category;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            description: row.description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// All categories, alphabetical.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        debug!("Listing categories");
        let rows: Vec<CategoryRow> =
            sqlx::query_as("SELECT id, name, description FROM categories ORDER BY name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    pub async fn insert(&self, name: &str, description: Option<&str>) -> DbResult<Category> {
        validate_category_name(name)?;

        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };
        debug!(id = %category.id, name = %category.name, "Inserting category");

        sqlx::query("INSERT INTO categories (id, name, description, created_at) VALUES (?, ?, ?, ?)")
            .bind(&category.id)
            .bind(&category.name)
            .bind(&category.description)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(&category.name))?;

        Ok(category)
    }

    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }
        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
