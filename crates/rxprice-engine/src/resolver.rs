//! # Unified Price Resolver
//!
//! Prices a product line, and whole carts, from every pricing source.
//!
//! ## Single Line
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  calculate_price(code, qty, options)                                    │
//! │                                                                         │
//! │  1. validate code, qty, price book, tax      ── InvalidInput            │
//! │  2. catalog.find_product(code)               ── ProductNotFound /       │
//! │                                                 CatalogUnavailable      │
//! │  3. concurrently, each with its own timeout:                            │
//! │       contract   (customer given, enabled)                              │
//! │       rules      (enabled)                                              │
//! │       volume     (enabled)                                              │
//! │     a failed or late source is logged and counts as "no price"          │
//! │  4. select_price(candidates)                 ── pure policy (core)      │
//! │  5. PricingResult::assemble                  ── breakdown, tax, stock   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cart
//! Every line is validated before any lookup. Lines are then priced with
//! bounded concurrency and returned in request order. The first failing
//! line rejects the whole cart, tagged with its index.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use rxprice_core::validation::{
    validate_price_book_id, validate_product_code, validate_quantity, validate_tax_rate,
};
use rxprice_core::{
    BulkPricingResult, CalculationContext, CartLine, CoreResult, PriceCandidates, PricingError,
    PricingOptions, PricingResult, Product, RoundingPolicy, RuleQuery, TaxRate,
    DEFAULT_PRICE_BOOK_ID,
};
use rxprice_db::Database;

use crate::contract::ContractPriceLookup;
use crate::error::{SourceError, SourceResult};
use crate::sources::{
    ContractPriceSource, PriceRuleEngine, ProductCatalog, SqliteCatalog, SqliteContracts,
    SqliteVolumeTiers, VolumeTierSource,
};
use crate::volume::VolumeTierMatcher;

// =============================================================================
// Settings
// =============================================================================

/// Resolver tuning, usually derived from `PricingConfig`.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub default_price_book_id: String,
    pub default_tax_rate: TaxRate,
    /// Bound on each source lookup, product lookup included.
    pub source_timeout: Duration,
    pub bulk_concurrency: usize,
    pub rounding: RoundingPolicy,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            default_price_book_id: DEFAULT_PRICE_BOOK_ID.to_string(),
            default_tax_rate: TaxRate::zero(),
            source_timeout: Duration::from_millis(2000),
            bulk_concurrency: 8,
            rounding: RoundingPolicy::exact(),
        }
    }
}

/// Options after validation and defaulting, shared by every line of a call.
#[derive(Debug, Clone)]
struct Prepared {
    price_book_id: String,
    tax_rate: TaxRate,
    when: DateTime<Utc>,
}

// =============================================================================
// Resolver
// =============================================================================

/// The unified price resolver.
///
/// Holds no mutable state; clone it freely and call it concurrently.
#[derive(Clone)]
pub struct PriceResolver {
    catalog: Arc<dyn ProductCatalog>,
    contracts: ContractPriceLookup,
    rules: Arc<dyn PriceRuleEngine>,
    tiers: VolumeTierMatcher,
    settings: ResolverSettings,
}

impl PriceResolver {
    pub fn new(
        catalog: Arc<dyn ProductCatalog>,
        contracts: Arc<dyn ContractPriceSource>,
        rules: Arc<dyn PriceRuleEngine>,
        tiers: Arc<dyn VolumeTierSource>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            contracts: ContractPriceLookup::new(catalog.clone(), contracts),
            tiers: VolumeTierMatcher::new(tiers, settings.rounding),
            catalog,
            rules,
            settings,
        }
    }

    /// Resolver over the SQLite store, with the given rule engine transport.
    pub fn with_database(db: Database, rules: Arc<dyn PriceRuleEngine>, settings: ResolverSettings) -> Self {
        Self::new(
            Arc::new(SqliteCatalog::new(db.clone())),
            Arc::new(SqliteContracts::new(db.clone())),
            rules,
            Arc::new(SqliteVolumeTiers::new(db)),
            settings,
        )
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub fn contracts(&self) -> &ContractPriceLookup {
        &self.contracts
    }

    pub fn volume_tiers(&self) -> &VolumeTierMatcher {
        &self.tiers
    }

    /// Looks up an active product by SKU or barcode.
    pub async fn find_product(&self, product_code: &str) -> CoreResult<Product> {
        let code = validate_product_code(product_code)?;

        match tokio::time::timeout(self.settings.source_timeout, self.catalog.find_product(code)).await {
            Ok(Ok(Some(product))) => Ok(product),
            Ok(Ok(None)) => Err(PricingError::ProductNotFound(code.to_string())),
            Ok(Err(e)) => {
                warn!(product_code = %code, error = %e, "Product lookup failed");
                Err(PricingError::CatalogUnavailable(e.to_string()))
            }
            Err(_) => {
                let e = SourceError::Timeout(self.settings.source_timeout);
                warn!(product_code = %code, error = %e, "Product lookup timed out");
                Err(PricingError::CatalogUnavailable(e.to_string()))
            }
        }
    }

    /// Prices one product line.
    pub async fn calculate_price(
        &self,
        product_code: &str,
        quantity: i64,
        options: &PricingOptions,
    ) -> CoreResult<PricingResult> {
        let prepared = self.prepare(options)?;
        let code = validate_product_code(product_code)?;
        validate_quantity(quantity)?;

        self.price_line(code, quantity, options, &prepared).await
    }

    /// Prices every line of a cart with shared options.
    pub async fn calculate_bulk_pricing(
        &self,
        items: &[CartLine],
        options: &PricingOptions,
    ) -> CoreResult<BulkPricingResult> {
        let prepared = self.prepare(options)?;

        let lines = items
            .iter()
            .enumerate()
            .map(|(index, line)| {
                validate_product_code(&line.product_code)
                    .and_then(|code| validate_quantity(line.quantity).map(|()| (index, code.to_string(), line.quantity)))
                    .map_err(|e| PricingError::from(e).at_line(index))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let prepared = &prepared;
        let results: Vec<PricingResult> = stream::iter(lines)
            .map(|(index, code, quantity): (usize, String, i64)| async move {
                self.price_line(&code, quantity, options, prepared)
                    .await
                    .map_err(|e| e.at_line(index))
            })
            .buffered(self.settings.bulk_concurrency.max(1))
            .try_collect()
            .await?;

        let bulk = BulkPricingResult::from_results(results)?;
        info!(
            lines = bulk.totals.line_count,
            subtotal = bulk.totals.subtotal.minor(),
            final_total = bulk.totals.final_total.minor(),
            "Cart priced"
        );
        Ok(bulk)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn prepare(&self, options: &PricingOptions) -> CoreResult<Prepared> {
        let price_book_id = match options.price_book_id.as_deref() {
            Some(id) => validate_price_book_id(id)?.to_string(),
            None => self.settings.default_price_book_id.clone(),
        };

        let tax_rate = match options.tax_rate {
            Some(pct) => validate_tax_rate(pct)?,
            None => self.settings.default_tax_rate,
        };

        Ok(Prepared {
            price_book_id,
            tax_rate,
            when: options.when.unwrap_or_else(Utc::now),
        })
    }

    async fn price_line(
        &self,
        code: &str,
        quantity: i64,
        options: &PricingOptions,
        prepared: &Prepared,
    ) -> CoreResult<PricingResult> {
        let product = self.find_product(code).await?;
        let list_price = product.list_price();

        let contract_lookup = async {
            match options.customer_id {
                Some(customer_id) if options.include_contract => {
                    self.contracts.for_product(customer_id, product.id).await
                }
                _ => Ok(None),
            }
        };

        let rule_lookup = async {
            if options.include_rules {
                let query = RuleQuery {
                    price_book_id: prepared.price_book_id.clone(),
                    sku: product.sku.clone(),
                    qty: quantity,
                    when: prepared.when,
                };
                self.rules.evaluate(&query).await
            } else {
                Ok(None)
            }
        };

        let volume_lookup = async {
            if options.include_volume_tiers {
                self.tiers
                    .calculate_volume_price(product.id, product.category_id, quantity, list_price, prepared.when)
                    .await
            } else {
                Ok(None)
            }
        };

        let (contract_price, rule, volume) = tokio::join!(
            self.guarded("contract", &product.sku, contract_lookup),
            self.guarded("rules", &product.sku, rule_lookup),
            self.guarded("volume_tiers", &product.sku, volume_lookup),
        );

        let candidates = PriceCandidates {
            list_price,
            contract_price,
            rule,
            volume,
        };

        let result = PricingResult::assemble(
            &product,
            quantity,
            candidates,
            CalculationContext {
                calculation_id: Uuid::new_v4().to_string(),
                customer_id: options.customer_id,
                price_book_id: prepared.price_book_id.clone(),
                tax_rate: prepared.tax_rate,
                timestamp: prepared.when,
            },
        );

        debug!(
            sku = %result.sku,
            quantity,
            pricing_source = result.pricing_source.as_str(),
            final_price = result.final_price.minor(),
            "Price resolved"
        );
        Ok(result)
    }

    /// Runs one source lookup under the source timeout. Failure and
    /// timeout both yield `None`.
    async fn guarded<T, F>(&self, source: &'static str, sku: &str, lookup: F) -> Option<T>
    where
        F: Future<Output = SourceResult<Option<T>>>,
    {
        match tokio::time::timeout(self.settings.source_timeout, lookup).await {
            Ok(Ok(value)) => value,
            Ok(Err(e)) => {
                warn!(source, sku, error = %e, "Pricing source failed, continuing without it");
                None
            }
            Err(_) => {
                let e = SourceError::Timeout(self.settings.source_timeout);
                warn!(source, sku, error = %e, "Pricing source timed out, continuing without it");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;
    use chrono::TimeZone;
    use rxprice_core::{Money, PricingSource, ValidationError};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn options() -> PricingOptions {
        PricingOptions {
            when: Some(now()),
            ..Default::default()
        }
    }

    fn customer_options(customer_id: i64) -> PricingOptions {
        PricingOptions {
            customer_id: Some(customer_id),
            ..options()
        }
    }

    struct Fixture {
        contracts: Arc<dyn ContractPriceSource>,
        rules: Arc<dyn PriceRuleEngine>,
        tiers: Arc<dyn VolumeTierSource>,
        settings: ResolverSettings,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                contracts: Arc::new(FakeContracts::single(1065, 1, 85_000)),
                rules: Arc::new(FakeRules::new(None)),
                tiers: Arc::new(FakeTiers::new(sp001_tiers())),
                settings: ResolverSettings::default(),
            }
        }

        fn build(self) -> PriceResolver {
            PriceResolver::new(
                Arc::new(FakeCatalog::new(vec![
                    sp001(),
                    product(2, "SP002", Some(3), 65_000, Some(25)),
                    product(3, "SP003", None, 32_000, Some(3)),
                ])),
                self.contracts,
                self.rules,
                self.tiers,
                self.settings,
            )
        }
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_list_price_when_nothing_applies() {
        let resolver = Fixture::new().build();
        let result = resolver.calculate_price("SP003", 2, &options()).await.unwrap();

        assert_eq!(result.final_price.minor(), 32_000);
        assert_eq!(result.pricing_source, PricingSource::ListPrice);
        assert_eq!(result.final_savings, Money::zero());
        assert_eq!(result.final_savings_percent, 0.0);
        assert!(result.contract_price.is_none());
        assert!(result.rule_price.is_none());
        assert!(result.volume_tier_price.is_none());
    }

    #[tokio::test]
    async fn test_contract_beats_volume_tier() {
        let resolver = Fixture::new().build();
        let result = resolver.calculate_price("SP001", 12, &customer_options(1065)).await.unwrap();

        assert_eq!(result.final_price.minor(), 85_000);
        assert_eq!(result.pricing_source, PricingSource::Contract);
        // The tier is computed and reported, never selected
        assert_eq!(result.volume_tier_price, Some(Money::from_minor(80_000)));
        assert_eq!(result.breakdown.volume_discount.minor(), 20_000);
        assert_eq!(result.breakdown.contract_discount.minor(), 15_000);
    }

    #[tokio::test]
    async fn test_contract_beats_cheaper_rule() {
        let mut fixture = Fixture::new();
        fixture.rules = Arc::new(FakeRules::new(Some(rule_match(50_000, 7))));
        let resolver = fixture.build();

        let result = resolver.calculate_price("SP001", 1, &customer_options(1065)).await.unwrap();
        assert_eq!(result.final_price.minor(), 85_000);
        assert_eq!(result.pricing_source, PricingSource::Contract);
        assert_eq!(result.rule_price, Some(Money::from_minor(50_000)));
    }

    #[tokio::test]
    async fn test_volume_tier_without_contract() {
        let resolver = Fixture::new().build();
        let result = resolver.calculate_price("SP001", 12, &options()).await.unwrap();

        assert_eq!(result.final_price.minor(), 80_000);
        assert_eq!(result.pricing_source, PricingSource::VolumeTiers);
        assert_eq!(result.final_savings.minor(), 20_000);
        assert_eq!(result.final_savings_percent, 20.0);
        assert_eq!(result.volume_tier.as_ref().map(|t| t.min_qty), Some(10));
    }

    #[tokio::test]
    async fn test_customer_without_contract_gets_tier() {
        let resolver = Fixture::new().build();
        let result = resolver.calculate_price("SP001", 12, &customer_options(1066)).await.unwrap();
        assert_eq!(result.pricing_source, PricingSource::VolumeTiers);
        assert_eq!(result.customer_id, Some(1066));
    }

    #[tokio::test]
    async fn test_lowest_of_rule_and_tier() {
        // Rule below tier: rule wins
        let mut fixture = Fixture::new();
        fixture.rules = Arc::new(FakeRules::new(Some(rule_match(75_000, 7))));
        let result = fixture.build().calculate_price("SP001", 12, &options()).await.unwrap();
        assert_eq!(result.pricing_source, PricingSource::Rules);
        assert_eq!(result.final_price.minor(), 75_000);
        assert_eq!(result.applied_rule.as_ref().and_then(|r| r.rule_id), Some(7));

        // Tier must be strictly lower to replace the rule
        let mut fixture = Fixture::new();
        fixture.rules = Arc::new(FakeRules::new(Some(rule_match(80_000, 7))));
        let result = fixture.build().calculate_price("SP001", 12, &options()).await.unwrap();
        assert_eq!(result.pricing_source, PricingSource::Rules);

        // Rule above tier: tier wins
        let mut fixture = Fixture::new();
        fixture.rules = Arc::new(FakeRules::new(Some(rule_match(95_000, 7))));
        let result = fixture.build().calculate_price("SP001", 12, &options()).await.unwrap();
        assert_eq!(result.pricing_source, PricingSource::VolumeTiers);
        assert_eq!(result.rule_price, Some(Money::from_minor(95_000)));
    }

    #[tokio::test]
    async fn test_rule_above_list_is_ignored() {
        let mut fixture = Fixture::new();
        fixture.rules = Arc::new(FakeRules::new(Some(rule_match(110_000, 7))));
        let result = fixture.build().calculate_price("SP001", 1, &options()).await.unwrap();

        assert_eq!(result.pricing_source, PricingSource::ListPrice);
        assert_eq!(result.final_price.minor(), 100_000);
    }

    // -------------------------------------------------------------------------
    // Options
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_disabled_sources_are_not_queried() {
        let rules = Arc::new(FakeRules::new(Some(rule_match(50_000, 7))));
        let mut fixture = Fixture::new();
        fixture.rules = rules.clone();
        let resolver = fixture.build();

        let opts = PricingOptions {
            include_contract: false,
            include_rules: false,
            include_volume_tiers: false,
            ..customer_options(1065)
        };
        let result = resolver.calculate_price("SP001", 12, &opts).await.unwrap();

        assert_eq!(rules.calls(), 0);
        assert_eq!(result.pricing_source, PricingSource::ListPrice);
        assert!(result.contract_price.is_none());
        assert!(result.volume_tier_price.is_none());
    }

    #[tokio::test]
    async fn test_rule_query_uses_default_book() {
        let resolver = Fixture::new().build();
        let result = resolver.calculate_price("SP001", 1, &options()).await.unwrap();
        assert_eq!(result.price_book_id, "default");

        let opts = PricingOptions {
            price_book_id: Some("wholesale".to_string()),
            ..options()
        };
        let result = resolver.calculate_price("SP001", 1, &opts).await.unwrap();
        assert_eq!(result.price_book_id, "wholesale");
    }

    #[tokio::test]
    async fn test_tax_and_total() {
        let resolver = Fixture::new().build();
        let opts = PricingOptions {
            tax_rate: Some(10.0),
            ..options()
        };
        let result = resolver.calculate_price("SP001", 12, &opts).await.unwrap();

        assert_eq!(result.breakdown.tax_amount.minor(), 8_000);
        assert_eq!(result.breakdown.total_amount.minor(), 88_000);
        assert_eq!(result.breakdown.tax_rate, 10.0);
    }

    #[tokio::test]
    async fn test_insufficient_stock_still_priced() {
        let resolver = Fixture::new().build();
        let result = resolver.calculate_price("SP003", 5, &options()).await.unwrap();

        assert!(!result.stock.is_sufficient);
        assert_eq!(result.stock.current_stock, Some(3));
        assert!(result.stock.warning.as_deref().unwrap().contains("SP003"));
        assert_eq!(result.final_price.minor(), 32_000);
    }

    #[tokio::test]
    async fn test_calculation_metadata() {
        let resolver = Fixture::new().build();
        let a = resolver.calculate_price("SP001", 1, &options()).await.unwrap();
        let b = resolver.calculate_price("SP001", 1, &options()).await.unwrap();

        assert_ne!(a.calculation_id, b.calculation_id);
        assert_eq!(a.calculation_timestamp, now());
    }

    // -------------------------------------------------------------------------
    // Errors and degradation
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_product_not_found() {
        let resolver = Fixture::new().build();
        let err = resolver.calculate_price("SP404", 1, &options()).await.unwrap_err();
        assert!(matches!(err, PricingError::ProductNotFound(code) if code == "SP404"));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected_before_lookup() {
        let resolver = PriceResolver::new(
            Arc::new(FailingSource),
            Arc::new(FailingSource),
            Arc::new(FailingSource),
            Arc::new(FailingSource),
            ResolverSettings::default(),
        );

        for (code, qty) in [("", 1), ("   ", 1), ("SP001", 0), ("SP001", -3)] {
            let err = resolver.calculate_price(code, qty, &options()).await.unwrap_err();
            assert!(matches!(err, PricingError::InvalidInput(_)), "{:?}", (code, qty));
        }

        let opts = PricingOptions {
            tax_rate: Some(150.0),
            ..options()
        };
        let err = resolver.calculate_price("SP001", 1, &opts).await.unwrap_err();
        assert!(matches!(err, PricingError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_catalog_failure_is_surfaced() {
        let resolver = PriceResolver::new(
            Arc::new(FailingSource),
            Arc::new(FakeContracts::none()),
            Arc::new(FakeRules::new(None)),
            Arc::new(FakeTiers::new(Vec::new())),
            ResolverSettings::default(),
        );
        let err = resolver.calculate_price("SP001", 1, &options()).await.unwrap_err();
        assert!(matches!(err, PricingError::CatalogUnavailable(_)));
    }

    #[tokio::test]
    async fn test_failing_sources_degrade_to_list_price() {
        let fixture = Fixture {
            contracts: Arc::new(FailingSource),
            rules: Arc::new(FailingSource),
            tiers: Arc::new(FailingSource),
            settings: ResolverSettings::default(),
        };
        let result = fixture.build().calculate_price("SP001", 12, &customer_options(1065)).await.unwrap();

        assert_eq!(result.final_price.minor(), 100_000);
        assert_eq!(result.pricing_source, PricingSource::ListPrice);
    }

    #[tokio::test]
    async fn test_one_failing_source_keeps_the_others() {
        let mut fixture = Fixture::new();
        fixture.rules = Arc::new(FailingSource);
        let result = fixture.build().calculate_price("SP001", 12, &options()).await.unwrap();

        assert_eq!(result.pricing_source, PricingSource::VolumeTiers);
        assert_eq!(result.final_price.minor(), 80_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_sources_time_out() {
        let fixture = Fixture {
            contracts: Arc::new(SlowSource(Duration::from_secs(30))),
            rules: Arc::new(SlowSource(Duration::from_secs(30))),
            tiers: Arc::new(SlowSource(Duration::from_secs(30))),
            settings: ResolverSettings {
                source_timeout: Duration::from_millis(50),
                ..Default::default()
            },
        };
        let result = fixture.build().calculate_price("SP001", 12, &customer_options(1065)).await.unwrap();

        // Each slow source would have produced a winning price
        assert_eq!(result.pricing_source, PricingSource::ListPrice);
        assert!(result.contract_price.is_none());
        assert!(result.rule_price.is_none());
        assert!(result.volume_tier_price.is_none());
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_bulk_totals_and_order() {
        let resolver = Fixture::new().build();
        let cart = vec![
            CartLine::new("SP003", 2),
            CartLine::new("SP001", 12),
            CartLine::new("SP002", 1),
        ];
        let opts = PricingOptions {
            tax_rate: Some(10.0),
            ..options()
        };

        let bulk = resolver.calculate_bulk_pricing(&cart, &opts).await.unwrap();

        let skus: Vec<&str> = bulk.items.iter().map(|l| l.pricing.sku.as_str()).collect();
        assert_eq!(skus, vec!["SP003", "SP001", "SP002"]);

        let expected_subtotal: i64 = bulk
            .items
            .iter()
            .map(|l| l.pricing.final_price.minor() * l.pricing.quantity)
            .sum();
        assert_eq!(bulk.totals.subtotal.minor(), expected_subtotal);
        // 2 × 32,000 + 12 × 80,000 + 65,000
        assert_eq!(expected_subtotal, 1_089_000);
        assert_eq!(bulk.totals.total_savings.minor(), 12 * 20_000);
        assert_eq!(bulk.totals.total_tax.minor(), 108_900);
        assert_eq!(bulk.totals.final_total.minor(), 1_197_900);
        assert_eq!(bulk.totals.total_quantity, 15);
    }

    #[tokio::test]
    async fn test_bulk_matches_single_line_pricing() {
        let resolver = Fixture::new().build();
        let opts = customer_options(1065);

        let single = resolver.calculate_price("SP001", 12, &opts).await.unwrap();
        let bulk = resolver
            .calculate_bulk_pricing(&[CartLine::new("SP001", 12)], &opts)
            .await
            .unwrap();

        let line = &bulk.items[0].pricing;
        assert_eq!(line.final_price, single.final_price);
        assert_eq!(line.pricing_source, single.pricing_source);
        assert_eq!(line.breakdown, single.breakdown);
    }

    #[tokio::test]
    async fn test_bulk_tiers_are_per_line() {
        let resolver = Fixture::new().build();
        let cart = vec![CartLine::new("SP001", 4), CartLine::new("SP001", 4)];
        let bulk = resolver.calculate_bulk_pricing(&cart, &options()).await.unwrap();

        // 8 units in the cart, but each line of 4 is below the 5+ tier
        assert!(bulk
            .items
            .iter()
            .all(|l| l.pricing.pricing_source == PricingSource::ListPrice));
    }

    #[tokio::test]
    async fn test_bulk_rejects_whole_cart_with_line_index() {
        let resolver = Fixture::new().build();

        let cart = vec![CartLine::new("SP001", 1), CartLine::new("SP404", 1)];
        let err = resolver.calculate_bulk_pricing(&cart, &options()).await.unwrap_err();
        assert!(matches!(err, PricingError::LineFailed { line: 1, .. }));
        assert!(matches!(err.root(), PricingError::ProductNotFound(_)));

        let cart = vec![CartLine::new("SP001", 1), CartLine::new("SP002", 0)];
        let err = resolver.calculate_bulk_pricing(&cart, &options()).await.unwrap_err();
        assert!(matches!(err, PricingError::LineFailed { line: 1, .. }));
        assert!(matches!(err.root(), PricingError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_bulk_rejects_line_amount_overflow() {
        let resolver = PriceResolver::new(
            Arc::new(FakeCatalog::new(vec![
                sp001(),
                product(9, "SP009", None, 10_000_000_000_000, None),
            ])),
            Arc::new(FakeContracts::none()),
            Arc::new(FakeRules::new(None)),
            Arc::new(FakeTiers::new(Vec::new())),
            ResolverSettings::default(),
        );

        // The line itself prices fine; only its subtotal overflows
        let single = resolver.calculate_price("SP009", 1_000_000, &options()).await.unwrap();
        assert_eq!(single.final_price.minor(), 10_000_000_000_000);

        let cart = vec![CartLine::new("SP001", 1), CartLine::new("SP009", 1_000_000)];
        let err = resolver.calculate_bulk_pricing(&cart, &options()).await.unwrap_err();
        assert!(matches!(err, PricingError::LineFailed { line: 1, .. }));
        assert!(matches!(
            err.root(),
            PricingError::InvalidInput(ValidationError::AmountOverflow { .. })
        ));
    }

    #[tokio::test]
    async fn test_bulk_line_tax_matches_single_line_tax() {
        let resolver = Fixture::new().build();
        let opts = PricingOptions {
            tax_rate: Some(8.25),
            ..options()
        };

        let single = resolver.calculate_price("SP003", 3, &opts).await.unwrap();
        let bulk = resolver
            .calculate_bulk_pricing(&[CartLine::new("SP003", 3)], &opts)
            .await
            .unwrap();

        // 32,000 × 8.25% = 2,640 per unit
        assert_eq!(single.breakdown.tax_amount.minor(), 2_640);
        assert_eq!(bulk.items[0].line_tax.minor(), 3 * 2_640);
        assert_eq!(bulk.totals.total_tax.minor(), 3 * 2_640);
    }

    #[tokio::test]
    async fn test_empty_cart() {
        let resolver = Fixture::new().build();
        let bulk = resolver.calculate_bulk_pricing(&[], &options()).await.unwrap();
        assert!(bulk.items.is_empty());
        assert_eq!(bulk.totals, Default::default());
    }

    #[tokio::test]
    async fn test_bulk_with_single_slot_concurrency() {
        let mut fixture = Fixture::new();
        fixture.settings.bulk_concurrency = 1;
        let resolver = fixture.build();

        let cart: Vec<CartLine> = (1..=6).map(|q| CartLine::new("SP001", q * 2)).collect();
        let bulk = resolver.calculate_bulk_pricing(&cart, &options()).await.unwrap();

        let quantities: Vec<i64> = bulk.items.iter().map(|l| l.pricing.quantity).collect();
        assert_eq!(quantities, vec![2, 4, 6, 8, 10, 12]);
        assert_eq!(bulk.items[5].pricing.final_price.minor(), 80_000);
        assert_eq!(bulk.items[2].pricing.final_price.minor(), 90_000);
    }
}
