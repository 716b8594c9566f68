//! # Cart Aggregation
//!
//! Line and cart totals for the Bulk/Cart Resolver.
//!
//! Each line is priced on its own (a volume tier sees only that line's
//! quantity). This module only multiplies and sums:
//!
//! ```text
//! line_subtotal = final_price × quantity
//! line_savings  = final_savings × quantity
//! line_tax      = breakdown.tax_amount × quantity
//! line_total    = line_subtotal + line_tax
//!
//! subtotal      = Σ line_subtotal
//! total_savings = Σ line_savings
//! total_tax     = Σ line_tax
//! final_total   = subtotal + total_tax
//! ```
//!
//! Tax is rounded per unit, so a line's tax is always its quantity times
//! the `tax_amount` a single-line calculation reports. Any amount that
//! overflows `Money` rejects the cart.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, PricingError, ValidationError};
use crate::money::Money;
use crate::result::PricingResult;
use crate::validation::ValidationResult;

/// One requested cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_code: String,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_code: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            product_code: product_code.into(),
            quantity,
        }
    }
}

/// A priced cart line: the single-line result plus line amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkLine {
    #[serde(flatten)]
    pub pricing: PricingResult,
    pub line_subtotal: Money,
    pub line_savings: Money,
    pub line_tax: Money,
    pub line_total: Money,
}

impl BulkLine {
    pub fn new(pricing: PricingResult) -> ValidationResult<Self> {
        let qty = pricing.quantity;
        let line_subtotal = times(pricing.final_price, qty, "line_subtotal")?;
        let line_savings = times(pricing.final_savings, qty, "line_savings")?;
        let line_tax = times(pricing.breakdown.tax_amount, qty, "line_tax")?;
        let line_total = plus(line_subtotal, line_tax, "line_total")?;

        Ok(BulkLine {
            pricing,
            line_subtotal,
            line_savings,
            line_tax,
            line_total,
        })
    }
}

fn times(amount: Money, qty: i64, field: &str) -> ValidationResult<Money> {
    amount.checked_mul_quantity(qty).ok_or_else(|| overflow(field))
}

fn plus(a: Money, b: Money, field: &str) -> ValidationResult<Money> {
    a.checked_add(b).ok_or_else(|| overflow(field))
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::AmountOverflow {
        field: field.to_string(),
    }
}

fn sum(mut amounts: impl Iterator<Item = Money>, field: &str) -> ValidationResult<Money> {
    amounts.try_fold(Money::zero(), |acc, m| plus(acc, m, field))
}

/// Cart-wide totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub total_savings: Money,
    pub total_tax: Money,
    pub final_total: Money,
}

/// Sums line amounts into cart totals.
pub fn aggregate(lines: &[BulkLine]) -> ValidationResult<BulkTotals> {
    let subtotal = sum(lines.iter().map(|l| l.line_subtotal), "subtotal")?;
    let total_tax = sum(lines.iter().map(|l| l.line_tax), "total_tax")?;
    let total_quantity = lines
        .iter()
        .try_fold(0i64, |acc, l| acc.checked_add(l.pricing.quantity))
        .ok_or_else(|| overflow("total_quantity"))?;

    Ok(BulkTotals {
        line_count: lines.len(),
        total_quantity,
        subtotal,
        total_savings: sum(lines.iter().map(|l| l.line_savings), "total_savings")?,
        total_tax,
        final_total: plus(subtotal, total_tax, "final_total")?,
    })
}

/// Result of pricing a whole cart. `items` keeps the request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BulkPricingResult {
    pub items: Vec<BulkLine>,
    pub totals: BulkTotals,
}

impl BulkPricingResult {
    /// Builds line amounts and totals from per-line results.
    ///
    /// A line whose amounts overflow fails with its index; an overflowing
    /// cart total fails without one.
    pub fn from_results(results: Vec<PricingResult>) -> CoreResult<Self> {
        let items = results
            .into_iter()
            .enumerate()
            .map(|(index, r)| BulkLine::new(r).map_err(|e| PricingError::from(e).at_line(index)))
            .collect::<CoreResult<Vec<_>>>()?;
        let totals = aggregate(&items)?;
        Ok(BulkPricingResult { items, totals })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
