//! Network transport of the price rule engine.
//!
//! `HttpRuleEngine` clients post a [`RuleQuery`] here; the answer comes
//! from the local [`InProcessRuleEngine`](rxprice_engine::InProcessRuleEngine),
//! so both transports give identical matches.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use tracing::debug;

use rxprice_core::validation::{validate_price_book_id, validate_product_code, validate_quantity};
use rxprice_core::{RuleMatch, RuleQuery};
use rxprice_engine::PriceRuleEngine;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(query): Json<RuleQuery>,
) -> Result<Json<Option<RuleMatch>>, ApiError> {
    validate_price_book_id(&query.price_book_id)?;
    validate_product_code(&query.sku)?;
    validate_quantity(query.qty)?;

    debug!(price_book_id = %query.price_book_id, sku = %query.sku, qty = query.qty, "evaluate rules");

    let matched = state.rules.evaluate(&query).await?;
    Ok(Json(matched))
}
