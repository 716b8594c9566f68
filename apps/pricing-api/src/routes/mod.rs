//! # HTTP Routes
//!
//! ```text
//! GET  /health                     → "OK"
//! POST /api/pricing/simulate       → PricingResult
//! POST /api/pricing/bulk           → BulkPricingResult
//! POST /api/price-rules/evaluate   → RuleMatch | null
//! GET  /api/products/{code}        → ProductDto (sku or barcode)
//! ```

pub mod price_rules;
pub mod pricing;
pub mod product;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use tracing::warn;

use crate::state::AppState;

/// Builds the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/pricing/simulate", post(pricing::simulate))
        .route("/api/pricing/bulk", post(pricing::bulk))
        .route("/api/price-rules/evaluate", post(price_rules::evaluate))
        .route("/api/products/{code}", get(product::get_product))
        .with_state(state)
}

/// Health check endpoint.
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if state.db.health_check().await {
        (StatusCode::OK, "OK")
    } else {
        warn!("Health check failed: database unreachable");
        (StatusCode::SERVICE_UNAVAILABLE, "DATABASE UNAVAILABLE")
    }
}
