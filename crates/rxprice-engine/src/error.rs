//! # Engine Error Types
//!
//! Error types for pricing sources and engine configuration.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Engine Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────────────────┐  ┌─────────────────────────────────┐  │
//! │  │  SourceError                │  │  ConfigError                    │  │
//! │  │  (one pricing source)       │  │  (startup)                      │  │
//! │  │                             │  │                                 │  │
//! │  │  Database    Transport      │  │  Invalid      LoadFailed        │  │
//! │  │  Timeout     Remote         │  │  InvalidUrl                     │  │
//! │  │  Decode                     │  │                                 │  │
//! │  └──────────────┬──────────────┘  └─────────────────────────────────┘  │
//! │                 │                                                       │
//! │                 ▼                                                       │
//! │  Resolver logs it at WARN and prices without that source.              │
//! │  A SourceError never reaches the caller of a calculation.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use thiserror::Error;

// =============================================================================
// Source Errors
// =============================================================================

/// Failure of a single pricing source lookup.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backing store failed.
    #[error("Database error: {0}")]
    Database(String),

    /// The lookup did not finish in time.
    #[error("Timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    /// Could not reach a remote source.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A remote source answered with an error status.
    #[error("Remote error (HTTP {status}): {message}")]
    Remote { status: u16, message: String },

    /// A remote answer could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<rxprice_db::DbError> for SourceError {
    fn from(err: rxprice_db::DbError) -> Self {
        SourceError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Remote {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

/// Result type alias for source lookups.
pub type SourceResult<T> = Result<T, SourceError>;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Engine configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A setting is out of range or inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A URL setting does not parse or has the wrong scheme.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    LoadFailed(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<url::ParseError> for ConfigError {
    fn from(err: url::ParseError) -> Self {
        ConfigError::InvalidUrl(err.to_string())
    }
}

/// Result type alias for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;
