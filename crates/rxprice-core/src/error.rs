//! # Error Types
//!
//! Domain-specific error types for rxprice-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  rxprice-core errors (this file)                                       │
//! │  ├── PricingError     - What a calculation can surface                 │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  rxprice-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  rxprice-engine errors (separate crate)                                │
//! │  └── SourceError      - A pricing source failed (never surfaced)       │
//! │                                                                         │
//! │  HTTP errors (in app)                                                  │
//! │  └── ApiError         - What API clients see (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → PricingError → ApiError → Client              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A calculation either returns a complete result or one of the
//! [`PricingError`] variants. Source failures are degraded inside the
//! resolver and have no variant here.

use thiserror::Error;

// =============================================================================
// Pricing Error
// =============================================================================

/// Errors a price calculation surfaces to its caller.
#[derive(Debug, Error)]
pub enum PricingError {
    /// No active product matches the code (SKU or barcode).
    ///
    /// The only lookup outcome that aborts a calculation.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Input rejected before any lookup was attempted.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// The product lookup itself failed, so there is nothing to price.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// One line of a cart failed; the whole cart is rejected.
    #[error("Line {line}: {source}")]
    LineFailed {
        line: usize,
        #[source]
        source: Box<PricingError>,
    },
}

impl PricingError {
    /// Wraps this error with the index of the cart line that produced it.
    pub fn at_line(self, line: usize) -> Self {
        PricingError::LineFailed {
            line,
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping line wrappers.
    pub fn root(&self) -> &PricingError {
        match self {
            PricingError::LineFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before any lookup runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., control characters in a code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// An amount derived from the input does not fit in `Money`.
    #[error("{field} is too large")]
    AmountOverflow { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with PricingError.
pub type CoreResult<T> = Result<T, PricingError>;

// =============================================================================
// Unit Tests
// =============================================================================
