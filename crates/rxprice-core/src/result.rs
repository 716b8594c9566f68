//! # Pricing Result
//!
//! Request options and the auditable result document of one calculation.
//!
//! ## Result Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PricingResult                                                          │
//! │  ├── list_price                       catalog price                    │
//! │  ├── contract_price?                  per-source candidates            │
//! │  ├── rule_price?  + applied_rule?     (reported even when not chosen)  │
//! │  ├── volume_tier_price? + volume_tier?                                 │
//! │  ├── final_price / pricing_source     what the policy picked           │
//! │  ├── final_savings(_percent)          always relative to list_price    │
//! │  ├── breakdown                        per-source deltas, tax, total    │
//! │  ├── stock                            informational, never blocking    │
//! │  └── calculation_id / calculation_timestamp                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The document is transient: it is recomputed on every request and never
//! stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::policy::{select_price, PriceCandidates};
use crate::rules::RuleMatch;
use crate::tiers::VolumePrice;
use crate::types::{bps_to_percentage, PricingSource, Product, TaxRate};

// =============================================================================
// Options
// =============================================================================

fn default_true() -> bool {
    true
}

/// Per-call options shared by single and bulk calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingOptions {
    /// Customer for contract lookup.
    #[serde(default)]
    pub customer_id: Option<i64>,

    /// Price book for rule evaluation (`None` = configured default book).
    #[serde(default)]
    pub price_book_id: Option<String>,

    #[serde(default = "default_true")]
    pub include_contract: bool,

    #[serde(default = "default_true")]
    pub include_rules: bool,

    #[serde(default = "default_true")]
    pub include_volume_tiers: bool,

    /// Tax percentage, 0 to 100 (`None` = configured default).
    #[serde(default)]
    pub tax_rate: Option<f64>,

    /// Evaluation timestamp (`None` = now).
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub when: Option<DateTime<Utc>>,
}

impl Default for PricingOptions {
    fn default() -> Self {
        PricingOptions {
            customer_id: None,
            price_book_id: None,
            include_contract: true,
            include_rules: true,
            include_volume_tiers: true,
            tax_rate: None,
            when: None,
        }
    }
}

impl PricingOptions {
    /// Options for one customer, everything else default.
    pub fn for_customer(customer_id: i64) -> Self {
        PricingOptions {
            customer_id: Some(customer_id),
            ..Default::default()
        }
    }
}

// =============================================================================
// Result Document
// =============================================================================

/// The price rule that produced `rule_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedRule {
    pub rule_id: Option<i64>,
    pub reason: Option<String>,
}

/// The volume tier that produced `volume_tier_price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedTier {
    pub tier_id: i64,
    pub min_qty: i64,
    pub max_qty: Option<i64>,
    pub discount_percent: Option<f64>,
    pub discount_amount: Option<Money>,
    pub savings: Money,
    pub savings_percent: f64,
    pub notes: Option<String>,
}

impl From<&VolumePrice> for AppliedTier {
    fn from(v: &VolumePrice) -> Self {
        AppliedTier {
            tier_id: v.tier.id,
            min_qty: v.tier.min_qty,
            max_qty: v.tier.max_qty,
            discount_percent: v.tier.discount_percent.map(|p| p.percentage()),
            discount_amount: v.tier.discount_amount,
            savings: v.savings,
            savings_percent: v.savings_percent,
            notes: v.tier.notes.clone(),
        }
    }
}

/// Numeric breakdown, per unit.
///
/// The three discounts are informational deltas against list price for
/// every source that produced a price; they do not sum to the savings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Breakdown {
    pub original_price: Money,
    pub contract_discount: Money,
    pub rule_discount: Money,
    pub volume_discount: Money,
    /// Percentage, for display.
    pub tax_rate: f64,
    pub tax_amount: Money,
    pub total_amount: Money,
}

/// Stock sufficiency for the requested quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockCheck {
    /// `None` when the product does not track stock.
    pub current_stock: Option<i64>,
    pub requested: i64,
    pub is_sufficient: bool,
    pub warning: Option<String>,
}

impl StockCheck {
    pub fn evaluate(product: &Product, requested: i64) -> Self {
        match product.current_stock {
            Some(available) if available < requested => StockCheck {
                current_stock: Some(available),
                requested,
                is_sufficient: false,
                warning: Some(format!(
                    "Insufficient stock for {}: available {}, requested {}",
                    product.sku, available, requested
                )),
            },
            current_stock => StockCheck {
                current_stock,
                requested,
                is_sufficient: true,
                warning: None,
            },
        }
    }
}

/// The complete, auditable outcome of one price calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingResult {
    pub calculation_id: String,
    pub product_id: i64,
    pub sku: String,
    pub product_name: String,
    pub quantity: i64,
    pub customer_id: Option<i64>,
    pub price_book_id: String,

    pub list_price: Money,
    pub contract_price: Option<Money>,
    pub rule_price: Option<Money>,
    pub applied_rule: Option<AppliedRule>,
    pub volume_tier_price: Option<Money>,
    pub volume_tier: Option<AppliedTier>,

    pub final_price: Money,
    pub final_savings: Money,
    pub final_savings_percent: f64,
    pub pricing_source: PricingSource,

    pub breakdown: Breakdown,
    pub stock: StockCheck,

    #[ts(as = "String")]
    pub calculation_timestamp: DateTime<Utc>,
}

/// Everything [`PricingResult::assemble`] needs besides the candidates.
#[derive(Debug, Clone)]
pub struct CalculationContext {
    pub calculation_id: String,
    pub customer_id: Option<i64>,
    pub price_book_id: String,
    pub tax_rate: TaxRate,
    pub timestamp: DateTime<Utc>,
}

impl PricingResult {
    /// Runs the selection policy and builds the result document.
    pub fn assemble(
        product: &Product,
        quantity: i64,
        candidates: PriceCandidates,
        ctx: CalculationContext,
    ) -> Self {
        let selection = select_price(&candidates);
        let list_price = candidates.list_price;

        let delta = |price: Option<Money>| price.map_or(Money::zero(), |p| list_price - p);
        let rule_price = candidates.rule_price();
        let volume_tier_price = candidates.volume_price();

        let final_savings = list_price - selection.final_price;
        let tax_amount = selection.final_price.calculate_tax(ctx.tax_rate);

        let breakdown = Breakdown {
            original_price: list_price,
            contract_discount: delta(candidates.contract_price),
            rule_discount: delta(rule_price),
            volume_discount: delta(volume_tier_price),
            tax_rate: ctx.tax_rate.percentage(),
            tax_amount,
            total_amount: selection.final_price + tax_amount,
        };

        PricingResult {
            calculation_id: ctx.calculation_id,
            product_id: product.id,
            sku: product.sku.clone(),
            product_name: product.name.clone(),
            quantity,
            customer_id: ctx.customer_id,
            price_book_id: ctx.price_book_id,
            list_price,
            contract_price: candidates.contract_price,
            rule_price,
            applied_rule: candidates.rule.as_ref().map(applied_rule),
            volume_tier_price,
            volume_tier: candidates.volume.as_ref().map(AppliedTier::from),
            final_price: selection.final_price,
            final_savings,
            final_savings_percent: bps_to_percentage(final_savings.share_of_bps(list_price)),
            pricing_source: selection.source,
            breakdown,
            stock: StockCheck::evaluate(product, quantity),
            calculation_timestamp: ctx.timestamp,
        }
    }
}

fn applied_rule(m: &RuleMatch) -> AppliedRule {
    AppliedRule {
        rule_id: m.applied_rule_id,
        reason: m.applied_reason.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::RoundingPolicy;
    use crate::tiers::{calculate_volume_price, TierScope, VolumeTier};
    use crate::types::Percent;
    use chrono::TimeZone;

    fn sp001(stock: Option<i64>) -> Product {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Product {
            id: 1,
            sku: "SP001".to_string(),
            barcode: None,
            name: "Paracetamol 500mg".to_string(),
            category_id: Some(3),
            base_price: Some(100_000),
            sale_price: None,
            current_stock: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn ctx(tax: TaxRate) -> CalculationContext {
        CalculationContext {
            calculation_id: "calc-1".to_string(),
            customer_id: None,
            price_book_id: "default".to_string(),
            tax_rate: tax,
            timestamp: Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap(),
        }
    }

    fn twenty_percent_at_ten() -> Vec<VolumeTier> {
        vec![VolumeTier {
            id: 1,
            scope: TierScope::Sku,
            target_id: 1,
            min_qty: 10,
            max_qty: None,
            discount_percent: Some(Percent::from_bps(2000)),
            discount_amount: None,
            effective_from: None,
            effective_to: None,
            is_active: true,
            notes: Some("case pack".to_string()),
        }]
    }

    fn candidates_for(product: &Product, qty: i64, contract: Option<i64>) -> PriceCandidates {
        let list = product.list_price();
        PriceCandidates {
            list_price: list,
            contract_price: contract.map(Money::from_minor),
            rule: None,
            volume: calculate_volume_price(
                &twenty_percent_at_ten(),
                product.id,
                product.category_id,
                qty,
                list,
                ctx(TaxRate::zero()).timestamp,
                RoundingPolicy::exact(),
            ),
        }
    }

    #[test]
    fn test_contract_scenario() {
        let product = sp001(Some(100));
        let result = PricingResult::assemble(
            &product,
            12,
            candidates_for(&product, 12, Some(85_000)),
            ctx(TaxRate::zero()),
        );

        assert_eq!(result.final_price.minor(), 85_000);
        assert_eq!(result.pricing_source, PricingSource::Contract);
        // Tier computed, reported, not selected
        assert_eq!(result.volume_tier_price.map(|m| m.minor()), Some(80_000));
        assert_eq!(result.volume_tier.as_ref().map(|t| t.tier_id), Some(1));
        assert_eq!(result.breakdown.contract_discount.minor(), 15_000);
        assert_eq!(result.breakdown.volume_discount.minor(), 20_000);
        assert_eq!(result.final_savings_percent, 15.0);
    }

    #[test]
    fn test_volume_scenario() {
        let product = sp001(Some(100));
        let result = PricingResult::assemble(
            &product,
            12,
            candidates_for(&product, 12, None),
            ctx(TaxRate::zero()),
        );

        assert_eq!(result.final_price.minor(), 80_000);
        assert_eq!(result.pricing_source, PricingSource::VolumeTiers);
        assert_eq!(result.final_savings.minor(), 20_000);
        assert_eq!(result.final_savings_percent, 20.0);
        assert_eq!(result.breakdown.contract_discount, Money::zero());
        assert_eq!(result.breakdown.rule_discount, Money::zero());
    }

    #[test]
    fn test_list_price_and_tax() {
        let product = sp001(None);
        let result = PricingResult::assemble(
            &product,
            4,
            candidates_for(&product, 4, None),
            ctx(TaxRate::from_bps(1000)),
        );

        assert_eq!(result.pricing_source, PricingSource::ListPrice);
        assert_eq!(result.final_price.minor(), 100_000);
        assert!(result.volume_tier.is_none());
        assert_eq!(result.breakdown.tax_rate, 10.0);
        assert_eq!(result.breakdown.tax_amount.minor(), 10_000);
        assert_eq!(result.breakdown.total_amount.minor(), 110_000);
        assert!(result.stock.is_sufficient);
    }

    #[test]
    fn test_applied_rule_detail() {
        let product = sp001(None);
        let mut candidates = PriceCandidates::list_only(product.list_price());
        candidates.rule = Some(RuleMatch {
            final_price: Money::from_minor(90_000),
            applied_rule_id: Some(7),
            applied_reason: Some("Summer: 10% off".to_string()),
        });

        let result = PricingResult::assemble(&product, 1, candidates, ctx(TaxRate::zero()));
        assert_eq!(result.pricing_source, PricingSource::Rules);
        assert_eq!(
            result.applied_rule,
            Some(AppliedRule {
                rule_id: Some(7),
                reason: Some("Summer: 10% off".to_string()),
            })
        );
        assert_eq!(result.breakdown.rule_discount.minor(), 10_000);
    }

    #[test]
    fn test_insufficient_stock_is_informational() {
        let product = sp001(Some(3));
        let result = PricingResult::assemble(
            &product,
            12,
            candidates_for(&product, 12, None),
            ctx(TaxRate::zero()),
        );

        assert_eq!(result.final_price.minor(), 80_000);
        assert!(!result.stock.is_sufficient);
        assert_eq!(
            result.stock.warning.as_deref(),
            Some("Insufficient stock for SP001: available 3, requested 12")
        );
    }

    #[test]
    fn test_zero_list_price() {
        let mut product = sp001(None);
        product.base_price = None;
        let result = PricingResult::assemble(
            &product,
            1,
            PriceCandidates::list_only(product.list_price()),
            ctx(TaxRate::zero()),
        );
        assert_eq!(result.final_price, Money::zero());
        assert_eq!(result.final_savings_percent, 0.0);
    }

    #[test]
    fn test_options_defaults_from_json() {
        let opts: PricingOptions = serde_json::from_str(r#"{"customer_id": 1065}"#).unwrap();
        assert_eq!(opts, PricingOptions::for_customer(1065));
        assert!(opts.include_contract && opts.include_rules && opts.include_volume_tiers);

        let opts: PricingOptions = serde_json::from_str(r#"{"include_rules": false}"#).unwrap();
        assert!(!opts.include_rules);
        assert!(opts.include_volume_tiers);
    }

    #[test]
    fn test_wire_shape() {
        let product = sp001(None);
        let result = PricingResult::assemble(
            &product,
            12,
            candidates_for(&product, 12, None),
            ctx(TaxRate::zero()),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["pricing_source"], "volume_tiers");
        assert_eq!(json["final_price"], 80000);
        assert_eq!(json["breakdown"]["original_price"], 100000);
        assert!(json["contract_price"].is_null());
    }
}
