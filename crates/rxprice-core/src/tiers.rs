//! # Volume Tiers
//!
//! Quantity-break discount brackets and the pure matching logic behind the
//! Volume Tier Matcher.
//!
//! ## Selection Algorithm
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Active tiers for (sku = product) OR (category = product.category)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  min_qty ≤ quantity ≤ max_qty (max absent = unbounded)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  effective_from ≤ as_of ≤ effective_to (absent bound = unbounded)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Largest min_qty wins (tightest bracket); same min_qty → lowest id     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Example: tiers `[min 5, 10% off]` and `[min 10, 20% off]` on one SKU.
//! Quantity 7 picks the first, 12 picks the second, 4 picks neither.
//!
//! Tiers without a usable discount are skipped rather than reported as
//! errors; a malformed tier never fails a calculation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, RoundingPolicy};
use crate::types::{bps_to_percentage, within_window, Percent};

// =============================================================================
// Types
// =============================================================================

/// What a tier is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum TierScope {
    /// `target_id` is a product id.
    Sku,
    /// `target_id` is a category id.
    Category,
}

/// The discount a tier grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TierDiscount {
    /// Percentage off the list price.
    Percent(Percent),
    /// Fixed amount off the list price (floored at zero).
    Amount(Money),
}

/// A quantity-break discount bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VolumeTier {
    pub id: i64,
    pub scope: TierScope,
    /// Product id (scope = sku) or category id (scope = category).
    pub target_id: i64,
    /// Inclusive lower bound.
    pub min_qty: i64,
    /// Inclusive upper bound; `None` = unbounded.
    pub max_qty: Option<i64>,
    pub discount_percent: Option<Percent>,
    pub discount_amount: Option<Money>,
    #[ts(as = "Option<String>")]
    pub effective_from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub effective_to: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub notes: Option<String>,
}

impl VolumeTier {
    /// The discount to apply. Percentage takes precedence when both are set.
    pub fn discount(&self) -> Option<TierDiscount> {
        match (self.discount_percent, self.discount_amount) {
            (Some(pct), _) => Some(TierDiscount::Percent(pct)),
            (None, Some(amount)) if !amount.is_negative() => Some(TierDiscount::Amount(amount)),
            _ => None,
        }
    }

    /// Checks whether the tier is attached to this product or its category.
    pub fn targets(&self, product_id: i64, category_id: Option<i64>) -> bool {
        match self.scope {
            TierScope::Sku => self.target_id == product_id,
            TierScope::Category => category_id == Some(self.target_id),
        }
    }

    /// Checks `min_qty ≤ quantity ≤ max_qty`.
    pub fn covers_quantity(&self, quantity: i64) -> bool {
        self.min_qty <= quantity && self.max_qty.map_or(true, |max| quantity <= max)
    }

    /// Checks the effective-date window.
    pub fn is_effective(&self, as_of: DateTime<Utc>) -> bool {
        within_window(self.effective_from, self.effective_to, as_of)
    }
}

/// A tier applied to a list price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct VolumePrice {
    pub tier: VolumeTier,
    pub original_price: Money,
    pub discounted_price: Money,
    pub savings: Money,
    /// `savings / original_price × 100`, two decimals; 0 when the list price is 0.
    pub savings_percent: f64,
}

// =============================================================================
// Matching
// =============================================================================

/// Returns every tier matching the product, quantity and date, best first.
///
/// Ordering: largest `min_qty` first, then lowest `id`. The first element
/// is the tier [`select_tier`] picks.
pub fn find_matching_tiers(
    tiers: &[VolumeTier],
    product_id: i64,
    category_id: Option<i64>,
    quantity: i64,
    as_of: DateTime<Utc>,
) -> Vec<VolumeTier> {
    let mut matching: Vec<VolumeTier> = tiers
        .iter()
        .filter(|t| t.is_active)
        .filter(|t| t.targets(product_id, category_id))
        .filter(|t| t.covers_quantity(quantity))
        .filter(|t| t.is_effective(as_of))
        .filter(|t| t.discount().is_some())
        .cloned()
        .collect();

    matching.sort_by(|a, b| b.min_qty.cmp(&a.min_qty).then(a.id.cmp(&b.id)));
    matching
}

/// Picks the single best-matching tier, if any.
pub fn select_tier(
    tiers: &[VolumeTier],
    product_id: i64,
    category_id: Option<i64>,
    quantity: i64,
    as_of: DateTime<Utc>,
) -> Option<VolumeTier> {
    find_matching_tiers(tiers, product_id, category_id, quantity, as_of)
        .into_iter()
        .next()
}

/// Applies a tier's discount to a list price.
///
/// Returns `None` when the tier carries no usable discount. The discounted
/// price is rounded by `rounding` and clamped to `[0, list_price]`.
pub fn apply_tier(
    tier: &VolumeTier,
    list_price: Money,
    rounding: RoundingPolicy,
) -> Option<VolumePrice> {
    let raw = match tier.discount()? {
        TierDiscount::Percent(pct) => list_price.apply_percentage_discount(pct),
        TierDiscount::Amount(amount) => list_price.minus_floored(amount),
    };

    let discounted_price = rounding.apply(raw).max(Money::zero()).min(list_price.max(Money::zero()));
    let savings = list_price - discounted_price;

    Some(VolumePrice {
        tier: tier.clone(),
        original_price: list_price,
        discounted_price,
        savings,
        savings_percent: bps_to_percentage(savings.share_of_bps(list_price)),
    })
}

/// Selects the best tier and prices it in one step.
pub fn calculate_volume_price(
    tiers: &[VolumeTier],
    product_id: i64,
    category_id: Option<i64>,
    quantity: i64,
    list_price: Money,
    as_of: DateTime<Utc>,
    rounding: RoundingPolicy,
) -> Option<VolumePrice> {
    let tier = select_tier(tiers, product_id, category_id, quantity, as_of)?;
    apply_tier(&tier, list_price, rounding)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PRODUCT: i64 = 1;
    const CATEGORY: i64 = 7;

    fn tier(id: i64, min_qty: i64, max_qty: Option<i64>, pct: Option<f64>) -> VolumeTier {
        VolumeTier {
            id,
            scope: TierScope::Sku,
            target_id: PRODUCT,
            min_qty,
            max_qty,
            discount_percent: pct.map(Percent::from_percentage),
            discount_amount: None,
            effective_from: None,
            effective_to: None,
            is_active: true,
            notes: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
    }

    fn brackets() -> Vec<VolumeTier> {
        vec![tier(1, 5, None, Some(10.0)), tier(2, 10, None, Some(20.0))]
    }

    #[test]
    fn test_bracket_selection() {
        let tiers = brackets();
        let at = now();

        assert_eq!(select_tier(&tiers, PRODUCT, None, 7, at).map(|t| t.id), Some(1));
        assert_eq!(select_tier(&tiers, PRODUCT, None, 12, at).map(|t| t.id), Some(2));
        assert_eq!(select_tier(&tiers, PRODUCT, None, 10, at).map(|t| t.id), Some(2));
        assert!(select_tier(&tiers, PRODUCT, None, 4, at).is_none());
    }

    #[test]
    fn test_find_matching_orders_best_first() {
        let tiers = brackets();
        let ids: Vec<i64> = find_matching_tiers(&tiers, PRODUCT, None, 12, now())
            .iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_same_min_qty_lowest_id_wins() {
        let tiers = vec![
            tier(9, 10, None, Some(30.0)),
            tier(4, 10, None, Some(5.0)),
            tier(6, 10, None, Some(15.0)),
        ];
        for _ in 0..3 {
            let chosen = select_tier(&tiers, PRODUCT, None, 10, now()).unwrap();
            assert_eq!(chosen.id, 4);
        }
    }

    #[test]
    fn test_max_qty_is_inclusive() {
        let tiers = vec![tier(1, 5, Some(9), Some(10.0))];
        assert!(select_tier(&tiers, PRODUCT, None, 9, now()).is_some());
        assert!(select_tier(&tiers, PRODUCT, None, 10, now()).is_none());
    }

    #[test]
    fn test_category_scope_and_targeting() {
        let mut category_tier = tier(3, 1, None, Some(5.0));
        category_tier.scope = TierScope::Category;
        category_tier.target_id = CATEGORY;
        let tiers = vec![category_tier];

        assert!(select_tier(&tiers, PRODUCT, Some(CATEGORY), 1, now()).is_some());
        assert!(select_tier(&tiers, PRODUCT, None, 1, now()).is_none());
        // A sku tier for another product never matches
        let other = vec![tier(5, 1, None, Some(5.0))];
        assert!(select_tier(&other, 2, Some(CATEGORY), 1, now()).is_none());
    }

    #[test]
    fn test_sku_and_category_compete_on_min_qty() {
        let mut category_tier = tier(3, 20, None, Some(25.0));
        category_tier.scope = TierScope::Category;
        category_tier.target_id = CATEGORY;
        let mut tiers = brackets();
        tiers.push(category_tier);

        let chosen = select_tier(&tiers, PRODUCT, Some(CATEGORY), 24, now()).unwrap();
        assert_eq!(chosen.id, 3);
    }

    #[test]
    fn test_effective_window_and_inactive() {
        let mut expired = tier(1, 1, None, Some(50.0));
        expired.effective_to = Some(now() - chrono::Duration::days(1));
        let mut future = tier(2, 1, None, Some(50.0));
        future.effective_from = Some(now() + chrono::Duration::days(1));
        let mut inactive = tier(3, 1, None, Some(50.0));
        inactive.is_active = false;

        let tiers = vec![expired, future, inactive];
        assert!(select_tier(&tiers, PRODUCT, None, 5, now()).is_none());
    }

    #[test]
    fn test_tier_without_discount_is_skipped() {
        let tiers = vec![tier(1, 1, None, None), tier(2, 5, None, None)];
        assert!(find_matching_tiers(&tiers, PRODUCT, None, 6, now()).is_empty());
    }

    #[test]
    fn test_percent_precedence_over_amount() {
        let mut both = tier(1, 1, None, Some(10.0));
        both.discount_amount = Some(Money::from_minor(50_000));
        assert_eq!(both.discount(), Some(TierDiscount::Percent(Percent::from_bps(1000))));
    }

    #[test]
    fn test_apply_percent_tier() {
        let priced = apply_tier(&tier(2, 10, None, Some(20.0)), Money::from_minor(100_000), RoundingPolicy::exact())
            .unwrap();
        assert_eq!(priced.discounted_price.minor(), 80_000);
        assert_eq!(priced.savings.minor(), 20_000);
        assert_eq!(priced.savings_percent, 20.0);
        assert_eq!(priced.original_price.minor(), 100_000);
    }

    #[test]
    fn test_amount_tier_never_negative() {
        let mut amount = tier(1, 1, None, None);
        amount.discount_amount = Some(Money::from_minor(150_000));

        let priced = apply_tier(&amount, Money::from_minor(100_000), RoundingPolicy::exact()).unwrap();
        assert_eq!(priced.discounted_price, Money::zero());
        assert_eq!(priced.savings.minor(), 100_000);
        assert_eq!(priced.savings_percent, 100.0);
    }

    #[test]
    fn test_zero_list_price_has_zero_percent() {
        let priced = apply_tier(&tier(1, 1, None, Some(10.0)), Money::zero(), RoundingPolicy::exact()).unwrap();
        assert_eq!(priced.discounted_price, Money::zero());
        assert_eq!(priced.savings_percent, 0.0);
    }

    #[test]
    fn test_rounding_policy_applies_and_stays_below_list() {
        // 84,600 × 0.85 = 71,910 → 72,000 with a 1,000 increment
        let priced = apply_tier(&tier(1, 1, None, Some(15.0)), Money::from_minor(84_600), RoundingPolicy::new(1000))
            .unwrap();
        assert_eq!(priced.discounted_price.minor(), 72_000);
        assert_eq!(priced.savings.minor(), 12_600);

        // Rounding up never lifts the price above list
        let priced = apply_tier(&tier(1, 1, None, Some(0.0)), Money::from_minor(84_600), RoundingPolicy::new(1000))
            .unwrap();
        assert_eq!(priced.discounted_price.minor(), 84_600);
    }

    #[test]
    fn test_calculate_volume_price_end_to_end() {
        let tiers = brackets();
        let list = Money::from_minor(100_000);

        let priced = calculate_volume_price(&tiers, PRODUCT, None, 12, list, now(), RoundingPolicy::exact()).unwrap();
        assert_eq!(priced.tier.id, 2);
        assert_eq!(priced.discounted_price.minor(), 80_000);

        assert!(calculate_volume_price(&tiers, PRODUCT, None, 4, list, now(), RoundingPolicy::exact()).is_none());
    }
}
