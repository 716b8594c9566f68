//! Hand-written fakes for the source traits.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use rxprice_core::tiers::{TierScope, VolumeTier};
use rxprice_core::{Money, Percent, Product, RuleMatch, RuleQuery};

use crate::error::{SourceError, SourceResult};
use crate::sources::{ContractPriceSource, PriceRuleEngine, ProductCatalog, VolumeTierSource};

pub fn product(id: i64, sku: &str, category_id: Option<i64>, base_price: i64, stock: Option<i64>) -> Product {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Product {
        id,
        sku: sku.to_string(),
        barcode: None,
        name: format!("Product {}", sku),
        category_id,
        base_price: Some(base_price),
        sale_price: None,
        current_stock: stock,
        is_active: true,
        created_at: created,
        updated_at: created,
    }
}

/// SP001: id 1, category 3, list 100,000, 40 in stock.
pub fn sp001() -> Product {
    product(1, "SP001", Some(3), 100_000, Some(40))
}

/// 10% off at 5+ and 20% off at 10+ on SP001.
pub fn sp001_tiers() -> Vec<VolumeTier> {
    let tier = |id: i64, min_qty: i64, pct: f64| VolumeTier {
        id,
        scope: TierScope::Sku,
        target_id: 1,
        min_qty,
        max_qty: None,
        discount_percent: Some(Percent::from_percentage(pct)),
        discount_amount: None,
        effective_from: None,
        effective_to: None,
        is_active: true,
        notes: None,
    };
    vec![tier(1, 5, 10.0), tier(2, 10, 20.0)]
}

pub fn rule_match(price: i64, rule_id: i64) -> RuleMatch {
    RuleMatch {
        final_price: Money::from_minor(price),
        applied_rule_id: Some(rule_id),
        applied_reason: Some(format!("rule {}", rule_id)),
    }
}

// =============================================================================
// Fakes
// =============================================================================

pub struct FakeCatalog {
    products: Vec<Product>,
}

impl FakeCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn with_sp001() -> Self {
        Self::new(vec![sp001()])
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn find_product(&self, code: &str) -> SourceResult<Option<Product>> {
        Ok(self
            .products
            .iter()
            .find(|p| p.is_active && p.matches_code(code))
            .cloned())
    }
}

/// (customer_id, product_id, net_price) rows.
pub struct FakeContracts {
    rows: Vec<(i64, i64, i64)>,
}

impl FakeContracts {
    pub fn none() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn single(customer_id: i64, product_id: i64, net_price: i64) -> Self {
        Self {
            rows: vec![(customer_id, product_id, net_price)],
        }
    }
}

#[async_trait]
impl ContractPriceSource for FakeContracts {
    async fn contract_price(&self, customer_id: i64, product_id: i64) -> SourceResult<Option<Money>> {
        Ok(self
            .rows
            .iter()
            .find(|(c, p, _)| *c == customer_id && *p == product_id)
            .map(|(_, _, net)| Money::from_minor(*net)))
    }
}

/// Returns a fixed answer and counts calls.
pub struct FakeRules {
    answer: Option<RuleMatch>,
    calls: AtomicUsize,
}

impl FakeRules {
    pub fn new(answer: Option<RuleMatch>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceRuleEngine for FakeRules {
    async fn evaluate(&self, _query: &RuleQuery) -> SourceResult<Option<RuleMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer.clone())
    }
}

pub struct FakeTiers {
    tiers: Vec<VolumeTier>,
}

impl FakeTiers {
    pub fn new(tiers: Vec<VolumeTier>) -> Self {
        Self { tiers }
    }
}

#[async_trait]
impl VolumeTierSource for FakeTiers {
    async fn active_tiers(&self, _product_id: i64, _category_id: Option<i64>) -> SourceResult<Vec<VolumeTier>> {
        Ok(self.tiers.clone())
    }
}

/// Every lookup fails.
pub struct FailingSource;

fn unavailable<T>() -> SourceResult<T> {
    Err(SourceError::Database("database is locked".to_string()))
}

#[async_trait]
impl ProductCatalog for FailingSource {
    async fn find_product(&self, _code: &str) -> SourceResult<Option<Product>> {
        unavailable()
    }
}

#[async_trait]
impl ContractPriceSource for FailingSource {
    async fn contract_price(&self, _customer_id: i64, _product_id: i64) -> SourceResult<Option<Money>> {
        unavailable()
    }
}

#[async_trait]
impl PriceRuleEngine for FailingSource {
    async fn evaluate(&self, _query: &RuleQuery) -> SourceResult<Option<RuleMatch>> {
        unavailable()
    }
}

#[async_trait]
impl VolumeTierSource for FailingSource {
    async fn active_tiers(&self, _product_id: i64, _category_id: Option<i64>) -> SourceResult<Vec<VolumeTier>> {
        unavailable()
    }
}

/// Every lookup sleeps, then answers with a price that would otherwise win.
pub struct SlowSource(pub Duration);

#[async_trait]
impl ContractPriceSource for SlowSource {
    async fn contract_price(&self, _customer_id: i64, _product_id: i64) -> SourceResult<Option<Money>> {
        tokio::time::sleep(self.0).await;
        Ok(Some(Money::from_minor(1)))
    }
}

#[async_trait]
impl PriceRuleEngine for SlowSource {
    async fn evaluate(&self, _query: &RuleQuery) -> SourceResult<Option<RuleMatch>> {
        tokio::time::sleep(self.0).await;
        Ok(Some(rule_match(1, 99)))
    }
}

#[async_trait]
impl VolumeTierSource for SlowSource {
    async fn active_tiers(&self, _product_id: i64, _category_id: Option<i64>) -> SourceResult<Vec<VolumeTier>> {
        tokio::time::sleep(self.0).await;
        Ok(sp001_tiers())
    }
}
