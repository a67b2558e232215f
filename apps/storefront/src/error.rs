//! # API Error Type
//!
//! Unified error type for storefront commands and HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront                         │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  POST /api/cart/coupon { code: "DIWALI10" }                             │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function   Result<T, ApiError>                          │  │
//! │  │         │                                                        │  │
//! │  │  Catalog / coupon read failed? ── DbError ── UPSTREAM_FETCH ────►│  │
//! │  │  Coupon expired?  ─────────────── CoreError ─ INVALID_COUPON ───►│  │
//! │  │  Storage write failed? ────────── StoreError ─ PERSISTENCE ─────►│  │
//! │  │  Success ───────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "INVALID_COUPON",                                            │
//! │    "message": "Coupon DIWALI10 cannot be applied: expired on ..." }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ekaksha_core::CoreError;
use ekaksha_db::DbError;
use ekaksha_store::StoreError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// API error returned from storefront commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 6f1c..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource or cart line not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Coupon unknown or expired (422)
    InvalidCoupon,

    /// Cart changed in memory but storage refused the write (507)
    PersistenceError,

    /// Catalog or coupon directory unreachable (502)
    UpstreamFetchError,

    /// Admin screen without a session (401)
    Unauthorized,

    /// Image upload or removal failed (500)
    ObjectStorageError,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidCoupon => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::PersistenceError => StatusCode::INSUFFICIENT_STORAGE,
            ErrorCode::UpstreamFetchError => StatusCode::BAD_GATEWAY,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::ObjectStorageError | ErrorCode::DatabaseError | ErrorCode::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn unauthorized() -> Self {
        ApiError::new(ErrorCode::Unauthorized, "Admin login required")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// A read from the catalog or coupon directory failed.
    ///
    /// The failure is logged and the shopper gets a retryable error; the
    /// cart and the rest of the page keep working.
    pub fn upstream(what: &str, err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            other => {
                error!(what, error = %other, "Upstream fetch failed");
                ApiError::new(
                    ErrorCode::UpstreamFetchError,
                    format!("Could not load {}, please try again", what),
                )
            }
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::InvalidData(message) => ApiError::validation(message),
            DbError::ObjectStorage(e) => {
                error!("Object storage failed: {}", e);
                ApiError::new(ErrorCode::ObjectStorageError, "Image storage failed")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Internal(e) => {
                error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::LineNotFound(id) => ApiError::not_found("Cart line", &id),
            e @ CoreError::InvalidCoupon { .. } => {
                ApiError::new(ErrorCode::InvalidCoupon, e.to_string())
            }
            e @ CoreError::QuantityOverflow { .. } => ApiError::validation(e.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cart(e) => ApiError::from(e),
            StoreError::Persistence { key, reason } => {
                warn!(key = %key, reason = %reason, "Storage write rejected");
                ApiError::new(
                    ErrorCode::PersistenceError,
                    "Your cart was updated but could not be saved on this device",
                )
            }
            StoreError::MalformedState { key, reason } => {
                error!(key = %key, reason = %reason, "Malformed stored state");
                ApiError::internal("Stored state is unreadable")
            }
            StoreError::Serialization(e) => {
                error!("Store serialization failed: {}", e);
                ApiError::internal("Could not encode stored state")
            }
            StoreError::Config(e) => {
                error!("Store misconfigured: {}", e);
                ApiError::internal("Storage is not configured")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Startup Error
// =============================================================================

/// Failures while bringing the storefront up. Never reaches a shopper.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}
