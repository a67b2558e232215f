//! # Error Types
//!
//! Domain-specific error types for ekaksha-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ekaksha-core errors (this file)                                       │
//! │  ├── CoreError        - Cart and coupon rule violations                │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  ekaksha-store errors  → StoreError (persistence, malformed state)     │
//! │  ekaksha-db errors     → DbError (queries, object storage)             │
//! │  storefront errors     → ApiError (what the frontend sees)             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError/DbError → ApiError     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The operation targets a product id with no line in the cart.
    ///
    /// `increment`, `decrement` and `remove` report this instead of silently
    /// doing nothing; the cart is left untouched.
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),

    /// The coupon is unknown or expired and cannot be selected.
    ///
    /// ## User Workflow
    /// ```text
    /// Apply Coupon "DIWALI10"
    ///      │
    ///      ▼
    /// expiry_date 2024-11-01 < today
    ///      │
    ///      ▼
    /// InvalidCoupon { code: "DIWALI10", reason: "expired on 2024-11-01" }
    ///      │
    ///      ▼
    /// UI shows the reason, selection unchanged
    /// ```
    #[error("Coupon {code} cannot be applied: {reason}")]
    InvalidCoupon { code: String, reason: String },

    /// Adding to a line would overflow its quantity counter.
    #[error("Quantity for {product_id} would overflow")]
    QuantityOverflow { product_id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidCoupon error.
    pub fn invalid_coupon(code: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidCoupon {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., bad email, unknown size).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Two fields that must agree do not.
    #[error("{field} does not match")]
    Mismatch { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::LineNotFound("tee-1".to_string());
        assert_eq!(err.to_string(), "Product tee-1 is not in the cart");

        let err = CoreError::invalid_coupon("SAVE10", "expired on 2024-01-01");
        assert_eq!(
            err.to_string(),
            "Coupon SAVE10 cannot be applied: expired on 2024-01-01"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::TooShort {
            field: "password".to_string(),
            min: 6,
        };
        assert_eq!(err.to_string(), "password must be at least 6 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
