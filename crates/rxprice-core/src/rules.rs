//! # Price Rules
//!
//! Price books, price rules and the pure evaluator behind the Price Rule
//! Engine.
//!
//! The resolver only ever sees a [`RuleMatch`]; whether it was produced in
//! process or behind an HTTP hop, the computation is [`evaluate_rules`].
//!
//! ## Evaluation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RuleQuery { price_book_id, sku, qty, when }                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Book active?  ──── no ────► None                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Rules of the book: active, scope matches product, min_qty ≤ qty,      │
//! │  effective_from ≤ when ≤ effective_to                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Highest priority wins; same priority → lowest id                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Adjustment on list price → round → floor at 0 → RuleMatch             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, RoundingPolicy};
use crate::types::{within_window, Percent, Product};

// =============================================================================
// Price Book
// =============================================================================

/// A named collection of price rules, selected per calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PriceBook {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

// =============================================================================
// Price Rule
// =============================================================================

/// What a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// Every product in the book.
    All,
    /// `target_id` is a product id.
    Sku,
    /// `target_id` is a category id.
    Category,
}

/// How a rule changes the list price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Adjustment {
    PercentOff(Percent),
    AmountOff(Money),
    FixedPrice(Money),
}

impl Adjustment {
    /// Applies the adjustment to a list price, before rounding.
    pub fn apply(&self, list_price: Money) -> Money {
        match *self {
            Adjustment::PercentOff(pct) => list_price.apply_percentage_discount(pct),
            Adjustment::AmountOff(amount) => list_price.minus_floored(amount),
            Adjustment::FixedPrice(price) => price.max(Money::zero()),
        }
    }

    /// Short human-readable description, e.g. `10% off`.
    pub fn describe(&self) -> String {
        match self {
            Adjustment::PercentOff(pct) => format!("{}% off", pct.percentage()),
            Adjustment::AmountOff(amount) => format!("{} off", amount),
            Adjustment::FixedPrice(price) => format!("fixed price {}", price),
        }
    }
}

/// A scoped, time-boxed pricing rule in a price book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceRule {
    pub id: i64,
    pub price_book_id: String,
    pub name: String,
    /// Higher wins.
    pub priority: i32,
    pub scope: RuleScope,
    /// Product id or category id; ignored for [`RuleScope::All`].
    pub target_id: Option<i64>,
    pub min_qty: i64,
    pub adjustment: Adjustment,
    #[ts(as = "Option<String>")]
    pub effective_from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub effective_to: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl PriceRule {
    /// Checks whether the rule targets this product.
    pub fn targets(&self, product_id: i64, category_id: Option<i64>) -> bool {
        match self.scope {
            RuleScope::All => true,
            RuleScope::Sku => self.target_id == Some(product_id),
            RuleScope::Category => category_id.is_some() && self.target_id == category_id,
        }
    }

    /// Checks whether the rule is live for `qty` units at `when`.
    pub fn is_applicable(&self, qty: i64, when: DateTime<Utc>) -> bool {
        self.is_active
            && self.min_qty <= qty
            && within_window(self.effective_from, self.effective_to, when)
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Input of the Price Rule Engine contract.
///
/// Also the JSON body of `POST /api/price-rules/evaluate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RuleQuery {
    pub price_book_id: String,
    pub sku: String,
    pub qty: i64,
    #[ts(as = "String")]
    pub when: DateTime<Utc>,
}

/// Output of the Price Rule Engine contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RuleMatch {
    pub final_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_rule_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_reason: Option<String>,
}

// =============================================================================
// Evaluation
// =============================================================================

/// Picks the winning rule: highest priority, then lowest id.
pub fn select_rule<'a>(
    book: &PriceBook,
    rules: &'a [PriceRule],
    product: &Product,
    qty: i64,
    when: DateTime<Utc>,
) -> Option<&'a PriceRule> {
    if !book.is_active {
        return None;
    }

    rules
        .iter()
        .filter(|r| r.price_book_id == book.id)
        .filter(|r| r.targets(product.id, product.category_id))
        .filter(|r| r.is_applicable(qty, when))
        .min_by(|a, b| b.priority.cmp(&a.priority).then(a.id.cmp(&b.id)))
}

/// Evaluates a price book for one product line.
///
/// Returns `None` when the book is inactive or no rule applies.
pub fn evaluate_rules(
    book: &PriceBook,
    rules: &[PriceRule],
    product: &Product,
    qty: i64,
    when: DateTime<Utc>,
    rounding: RoundingPolicy,
) -> Option<RuleMatch> {
    let rule = select_rule(book, rules, product, qty, when)?;
    let price = rounding
        .apply(rule.adjustment.apply(product.list_price()))
        .max(Money::zero());

    Some(RuleMatch {
        final_price: price,
        applied_rule_id: Some(rule.id),
        applied_reason: Some(format!("{}: {}", rule.name, rule.adjustment.describe())),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
