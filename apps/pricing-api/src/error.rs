//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Pricing API                        │
//! │                                                                         │
//! │  Handler  ── Result<Json<T>, ApiError>                                 │
//! │     │                                                                   │
//! │     ├── PricingError::ProductNotFound   ──► 404 NOT_FOUND              │
//! │     ├── PricingError::InvalidInput      ──► 400 VALIDATION_ERROR       │
//! │     ├── PricingError::CatalogUnavailable──► 503 DATABASE_ERROR         │
//! │     ├── PricingError::LineFailed        ──► inner code, "Line N: ..."  │
//! │     ├── SourceError / DbError           ──► 503 DATABASE_ERROR         │
//! │     └── anything else                   ──► 500 INTERNAL               │
//! │                                                                         │
//! │  Body: { "code": "NOT_FOUND", "message": "Product not found: SP404" }  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use rxprice_core::{PricingError, ValidationError};
use rxprice_db::DbError;
use rxprice_engine::SourceError;

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// Catalog or pricing store unavailable (503)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::DatabaseError => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
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
}

impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::ProductNotFound(code) => ApiError::not_found("Product", &code),
            PricingError::InvalidInput(e) => ApiError::validation(e.to_string()),
            PricingError::CatalogUnavailable(msg) => {
                tracing::error!("Catalog unavailable: {}", msg);
                ApiError::new(ErrorCode::DatabaseError, "Product catalog unavailable")
            }
            PricingError::LineFailed { line, source } => {
                let inner = ApiError::from(*source);
                ApiError::new(inner.code, format!("Line {}: {}", line, inner.message))
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<SourceError> for ApiError {
    fn from(err: SourceError) -> Self {
        tracing::error!("Pricing source failed: {}", err);
        ApiError::new(ErrorCode::DatabaseError, "Pricing data unavailable")
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            other if other.is_unavailable() => {
                tracing::error!("Database unavailable: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database unavailable")
            }
            other => {
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::Internal, "Database operation failed")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_error_mapping() {
        let err = ApiError::from(PricingError::ProductNotFound("SP404".into()));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Product not found: SP404");
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);

        let err = ApiError::from(PricingError::from(ValidationError::MustBePositive {
            field: "quantity".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err = ApiError::from(PricingError::CatalogUnavailable("database is locked".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("locked"));
    }

    #[test]
    fn test_line_errors_keep_inner_code() {
        let err = ApiError::from(PricingError::ProductNotFound("SP404".into()).at_line(3));
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Line 3: Product not found: SP404");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::not_found("Product", "SP404")).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Product not found: SP404");
    }
}
