//! # Validation Module
//!
//! Input validation for pricing requests.
//!
//! Every check here runs before the resolver touches a pricing source, so
//! an invalid request never costs a lookup.
//!
//! ## Usage
//! ```rust
//! use rxprice_core::validation::{validate_product_code, validate_quantity};
//!
//! assert!(validate_product_code("SP001").is_ok());
//! assert!(validate_quantity(12).is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::TaxRate;
use crate::MAX_LINE_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted product code or price-book id.
const MAX_CODE_LEN: usize = 64;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code (SKU or barcode) and returns it trimmed.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 64 characters
/// - No control characters
pub fn validate_product_code(code: &str) -> ValidationResult<&str> {
    validate_code("product_code", code)
}

/// Validates a price-book id and returns it trimmed.
pub fn validate_price_book_id(id: &str) -> ValidationResult<&str> {
    validate_code("price_book_id", id)
}

fn validate_code<'a>(field: &str, value: &'a str) -> ValidationResult<&'a str> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if value.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    Ok(value)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_LINE_QUANTITY`]
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0 to 10000).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates a decimal tax percentage (0 to 100) and converts it.
///
/// ```rust
/// use rxprice_core::validation::validate_tax_rate;
///
/// assert_eq!(validate_tax_rate(10.0).unwrap().bps(), 1000);
/// assert!(validate_tax_rate(-1.0).is_err());
/// assert!(validate_tax_rate(f64::NAN).is_err());
/// ```
pub fn validate_tax_rate(pct: f64) -> ValidationResult<TaxRate> {
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 100,
        });
    }

    let rate = TaxRate::from_percentage(pct);
    validate_tax_rate_bps(rate.bps())?;
    Ok(rate)
}

// =============================================================================
// Unit Tests
// =============================================================================
