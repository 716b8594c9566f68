//! # Product Lookup
//!
//! `GET /api/products/{code}` resolves a scanned barcode or typed SKU the
//! same way a price calculation does: active products only, sku or
//! barcode match.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use rxprice_core::{Money, Product};

use crate::error::ApiError;
use crate::state::AppState;

/// Product as exposed to POS clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: i64,
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub category_id: Option<i64>,
    pub base_price: Option<i64>,
    pub sale_price: Option<i64>,
    /// Sale price if set, else base price.
    pub list_price: Money,
    pub current_stock: Option<i64>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            list_price: p.list_price(),
            id: p.id,
            sku: p.sku,
            barcode: p.barcode,
            name: p.name,
            category_id: p.category_id,
            base_price: p.base_price,
            sale_price: p.sale_price,
            current_stock: p.current_stock,
        }
    }
}

pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<ProductDto>, ApiError> {
    debug!(code = %code, "get_product");

    let product = state.resolver.find_product(&code).await?;
    Ok(Json(ProductDto::from(product)))
}
