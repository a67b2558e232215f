//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / std::io::Error                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (storefront) ← catalog/coupon reads become                   │
//! │                          UPSTREAM_FETCH_ERROR                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (coupon code, category name, admin email).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Upload, read or delete in the object store failed.
    #[error("Object storage error: {0}")]
    ObjectStorage(String),

    /// A stored row could not be turned into a domain value.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Rewrites a generic unique violation with the offending value.
    pub(crate) fn with_duplicate_value(self, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, value),
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → UNIQUE constraint? UniqueViolation : QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::duplicate(field, "unknown")
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("Timed out waiting for a connection".to_string())
            }

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<ekaksha_core::ValidationError> for DbError {
    fn from(err: ekaksha_core::ValidationError) -> Self {
        DbError::InvalidData(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_value_rewrite() {
        let err = DbError::duplicate("coupons.code", "unknown").with_duplicate_value("SAVE10");
        assert_eq!(err.to_string(), "Duplicate coupons.code: 'SAVE10' already exists");

        let err = DbError::not_found("Coupon", "x").with_duplicate_value("SAVE10");
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
