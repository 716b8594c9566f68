//! # Pricing Endpoints
//!
//! ```text
//! POST /api/pricing/simulate
//!   { "sku": "SP001", "qty": 12, "customer_id": 1065, "tax_rate": 10 }
//!        │
//!        ▼
//!   PriceResolver::calculate_price ──► PricingResult
//!
//! POST /api/pricing/bulk
//!   { "items": [{ "product_code": "SP001", "quantity": 12 }, ...],
//!     "customer_id": 1065 }
//!        │
//!        ▼
//!   PriceResolver::calculate_bulk_pricing ──► { items, totals }
//! ```
//!
//! Every option of [`PricingOptions`] may be given at the top level of
//! either body.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use rxprice_core::{BulkPricingResult, CartLine, PricingOptions, PricingResult};

use crate::error::ApiError;
use crate::state::AppState;

/// Body of `POST /api/pricing/simulate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRequest {
    /// Product code (SKU or barcode).
    pub sku: String,
    pub qty: i64,
    #[serde(flatten)]
    pub options: PricingOptions,
}

/// Body of `POST /api/pricing/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRequest {
    pub items: Vec<CartLine>,
    #[serde(flatten)]
    pub options: PricingOptions,
}

pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<PricingResult>, ApiError> {
    debug!(sku = %request.sku, qty = request.qty, customer_id = ?request.options.customer_id, "simulate");

    let result = state
        .resolver
        .calculate_price(&request.sku, request.qty, &request.options)
        .await?;

    Ok(Json(result))
}

pub async fn bulk(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BulkRequest>,
) -> Result<Json<BulkPricingResult>, ApiError> {
    let start = Instant::now();

    let result = state
        .resolver
        .calculate_bulk_pricing(&request.items, &request.options)
        .await?;

    info!(
        lines = result.totals.line_count,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "bulk pricing"
    );
    Ok(Json(result))
}
