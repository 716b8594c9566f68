//! # rxprice Pricing API
//!
//! HTTP front end of the price resolution engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Pricing API Server                              │
//! │                                                                         │
//! │  POS terminal ───► axum (8080) ───► routes ───► PriceResolver         │
//! │                                        │              │                 │
//! │  HttpRuleEngine ─► /api/price-rules ───┘              ▼                 │
//! │  (other nodes)     /evaluate              rxprice-db (SQLite)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! `rxprice.toml` plus `RXPRICE_*` environment overrides, see
//! [`rxprice_engine::PricingConfig`].

pub mod error;
pub mod routes;
pub mod state;

// Re-exports
pub use error::{ApiError, ErrorCode};
pub use routes::router;
pub use state::AppState;
