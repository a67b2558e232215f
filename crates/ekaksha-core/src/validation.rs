//! # Validation Module
//!
//! Input validation for cart operations and the admin back-office forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web frontend                                                 │
//! │  └── Required fields, immediate feedback                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Storefront command (Rust)                                    │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE constraints (coupon code, category name, admin email)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ekaksha_core::validation::{validate_coupon_code, validate_new_password};
//!
//! validate_coupon_code("DIWALI10").unwrap();
//! assert!(validate_new_password("secret1", "secret2").is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_DISCOUNT_PERCENT, MAX_OFFER_PRICE_PAISE, MIN_PASSWORD_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

fn too_long(field: &str, max: usize) -> ValidationError {
    ValidationError::TooLong {
        field: field.to_string(),
        max,
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(required("name"));
    }
    if name.chars().count() > 200 {
        return Err(too_long("name", 200));
    }
    Ok(())
}

/// Validates the number of items bundled in one offer.
///
/// ```rust
/// use ekaksha_core::validation::validate_offer_quantity;
///
/// assert!(validate_offer_quantity(2).is_ok());
/// assert!(validate_offer_quantity(0).is_err());
/// ```
pub fn validate_offer_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "offerQuantity".to_string(),
        });
    }
    Ok(())
}

/// Validates an offer price. Zero is allowed (free gifts).
pub fn validate_offer_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() || price.paise() > MAX_OFFER_PRICE_PAISE {
        return Err(ValidationError::OutOfRange {
            field: "offerPrice".to_string(),
            min: 0,
            max: MAX_OFFER_PRICE_PAISE,
        });
    }
    Ok(())
}

/// Validates a category name.
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(required("category"));
    }
    if name.chars().count() > 100 {
        return Err(too_long("category", 100));
    }
    Ok(())
}

/// Validates the file name of an uploaded object.
///
/// ## Rules
/// - Not empty, at most 255 bytes
/// - No path separators and no `..`, so a key can never leave its bucket
pub fn validate_object_key(key: &str) -> ValidationResult<()> {
    if key.trim().is_empty() {
        return Err(required("fileName"));
    }
    if key.len() > 255 {
        return Err(too_long("fileName", 255));
    }
    if key.contains('/') || key.contains('\\') || key.contains("..") || key.starts_with('.') {
        return Err(ValidationError::InvalidFormat {
            field: "fileName".to_string(),
            reason: "must be a plain file name".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Cart
// =============================================================================

/// Validates the number of offer bundles added to or held in the cart.
pub fn validate_cart_quantity(qty: u32) -> ValidationResult<()> {
    if qty == 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Coupons
// =============================================================================

/// Validates a coupon code.
///
/// ## Rules
/// - Must not be empty
/// - At most 32 characters
/// - Letters, digits, hyphens and underscores only
pub fn validate_coupon_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(required("code"));
    }
    if code.len() > 32 {
        return Err(too_long("code", 32));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }
    Ok(())
}

/// Validates a coupon's discount percentage (0-100).
pub fn validate_discount_percent(percent: i64) -> ValidationResult<u8> {
    if !(0..=i64::from(MAX_DISCOUNT_PERCENT)).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "discountPercent".to_string(),
            min: 0,
            max: i64::from(MAX_DISCOUNT_PERCENT),
        });
    }
    Ok(percent as u8)
}

// =============================================================================
// Admin
// =============================================================================

/// Validates an email address well enough to catch typos.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(required("email"));
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err(invalid());
    }
    Ok(())
}

/// Validates a new admin password from the settings screen.
///
/// ## Rules
/// - At least [`MIN_PASSWORD_LEN`] characters
/// - Must equal the confirmation field
pub fn validate_new_password(password: &str, confirm: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }
    if password != confirm {
        return Err(ValidationError::Mismatch {
            field: "confirmPassword".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use ekaksha_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(required("id"));
    }
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Linen Shirt").is_ok());
        assert!(validate_product_name("   ").is_err());
        assert!(validate_product_name(&"A".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_offer() {
        assert!(validate_offer_quantity(1).is_ok());
        assert!(validate_offer_quantity(0).is_err());
        assert!(validate_offer_price(Money::zero()).is_ok());
        assert!(validate_offer_price(Money::from_paise(-1)).is_err());
        assert!(validate_offer_price(Money::from_paise(MAX_OFFER_PRICE_PAISE)).is_ok());
        assert!(validate_offer_price(Money::from_paise(MAX_OFFER_PRICE_PAISE + 1)).is_err());
        assert!(validate_offer_price(Money::from_paise(i64::MAX / 2)).is_err());
    }

    #[test]
    fn test_validate_object_key() {
        assert!(validate_object_key("1700000000000_shirt.png").is_ok());
        assert!(validate_object_key("").is_err());
        assert!(validate_object_key("../etc/passwd").is_err());
        assert!(validate_object_key("nested/shirt.png").is_err());
        assert!(validate_object_key(".hidden").is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert!(validate_coupon_code("SAVE10").is_ok());
        assert!(validate_coupon_code("new_user-5").is_ok());
        assert!(validate_coupon_code("").is_err());
        assert!(validate_coupon_code("HAS SPACE").is_err());
        assert!(validate_coupon_code(&"X".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_discount_percent() {
        assert_eq!(validate_discount_percent(0).unwrap(), 0);
        assert_eq!(validate_discount_percent(100).unwrap(), 100);
        assert!(validate_discount_percent(101).is_err());
        assert!(validate_discount_percent(-5).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("admin@ekaksha.in").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("admin").is_err());
        assert!(validate_email("@ekaksha.in").is_err());
        assert!(validate_email("admin@localhost").is_err());
        assert!(validate_email("ad min@ekaksha.in").is_err());
    }

    #[test]
    fn test_validate_new_password() {
        assert!(validate_new_password("secret1", "secret1").is_ok());
        assert!(matches!(
            validate_new_password("short", "short"),
            Err(ValidationError::TooShort { min: 6, .. })
        ));
        assert!(matches!(
            validate_new_password("secret1", "secret2"),
            Err(ValidationError::Mismatch { .. })
        ));
    }

    #[test]
    fn test_validate_cart_quantity() {
        assert!(validate_cart_quantity(1).is_ok());
        assert!(validate_cart_quantity(0).is_err());
    }
}
