//! # Pricing Sources
//!
//! One small async trait per collaborator the resolver consults, plus the
//! SQLite-backed implementations used in production.
//!
//! ```text
//! ┌──────────────────────┐     ┌───────────────────────────────────────┐
//! │  PriceResolver       │     │  SQLite adapters (this module)        │
//! │                      │     │                                       │
//! │  Arc<dyn Product...> │────►│  SqliteCatalog       → products       │
//! │  Arc<dyn Contract..> │────►│  SqliteContracts     → contract_prices│
//! │  Arc<dyn PriceRule..>│────►│  (rule_engine.rs)                     │
//! │  Arc<dyn VolumeTier> │────►│  SqliteVolumeTiers   → volume_tiers   │
//! └──────────────────────┘     └───────────────────────────────────────┘
//! ```
//!
//! Tests substitute hand-written fakes for any of these.

use async_trait::async_trait;
use tracing::debug;

use rxprice_core::{Money, Product, RuleMatch, RuleQuery, VolumeTier};
use rxprice_db::Database;

use crate::error::SourceResult;

// =============================================================================
// Traits
// =============================================================================

/// Resolves a product code (SKU or barcode) to an active product.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn find_product(&self, code: &str) -> SourceResult<Option<Product>>;
}

/// Negotiated net prices per (customer, product).
#[async_trait]
pub trait ContractPriceSource: Send + Sync {
    /// The active net price for the pair, if any.
    async fn contract_price(&self, customer_id: i64, product_id: i64) -> SourceResult<Option<Money>>;
}

/// The price rule engine contract.
///
/// Same query, same answer, whatever the transport.
#[async_trait]
pub trait PriceRuleEngine: Send + Sync {
    async fn evaluate(&self, query: &RuleQuery) -> SourceResult<Option<RuleMatch>>;
}

/// Active volume tiers attached to a product or its category.
#[async_trait]
pub trait VolumeTierSource: Send + Sync {
    async fn active_tiers(&self, product_id: i64, category_id: Option<i64>) -> SourceResult<Vec<VolumeTier>>;
}

// =============================================================================
// SQLite Adapters
// =============================================================================

/// Product catalog backed by the `products` table.
#[derive(Debug, Clone)]
pub struct SqliteCatalog {
    db: Database,
}

impl SqliteCatalog {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductCatalog for SqliteCatalog {
    async fn find_product(&self, code: &str) -> SourceResult<Option<Product>> {
        Ok(self.db.products().find_by_code(code).await?)
    }
}

/// Contract prices backed by the `contract_prices` table.
#[derive(Debug, Clone)]
pub struct SqliteContracts {
    db: Database,
}

impl SqliteContracts {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContractPriceSource for SqliteContracts {
    async fn contract_price(&self, customer_id: i64, product_id: i64) -> SourceResult<Option<Money>> {
        let contract = self.db.contracts().find_active(customer_id, product_id).await?;

        if contract.is_none() && !self.db.customers().exists(customer_id).await? {
            debug!(customer_id, "Unknown customer, no contract pricing");
        }

        Ok(contract.map(|c| c.net_price()))
    }
}

/// Volume tiers backed by the `volume_tiers` table.
#[derive(Debug, Clone)]
pub struct SqliteVolumeTiers {
    db: Database,
}

impl SqliteVolumeTiers {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VolumeTierSource for SqliteVolumeTiers {
    async fn active_tiers(&self, product_id: i64, category_id: Option<i64>) -> SourceResult<Vec<VolumeTier>> {
        Ok(self.db.volume_tiers().active_for(product_id, category_id).await?)
    }
}
