//! # Volume Tier Matcher
//!
//! Loads the tiers attached to a product or its category and hands them to
//! the bracket selection in `rxprice_core::tiers`.
//!
//! Malformed tiers (no usable discount) are skipped, never reported. Only
//! a failing tier source produces an error, which the resolver treats as
//! "no volume pricing".

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use rxprice_core::tiers;
use rxprice_core::{Money, RoundingPolicy, VolumePrice, VolumeTier};

use crate::error::SourceResult;
use crate::sources::VolumeTierSource;

/// Volume tier matcher over a tier source.
#[derive(Clone)]
pub struct VolumeTierMatcher {
    source: Arc<dyn VolumeTierSource>,
    rounding: RoundingPolicy,
}

impl VolumeTierMatcher {
    pub fn new(source: Arc<dyn VolumeTierSource>, rounding: RoundingPolicy) -> Self {
        Self { source, rounding }
    }

    /// Every tier matching product, quantity and date, best first.
    pub async fn find_matching_tiers(
        &self,
        product_id: i64,
        category_id: Option<i64>,
        quantity: i64,
        as_of: DateTime<Utc>,
    ) -> SourceResult<Vec<VolumeTier>> {
        let candidates = self.source.active_tiers(product_id, category_id).await?;
        let matching = tiers::find_matching_tiers(&candidates, product_id, category_id, quantity, as_of);

        debug!(
            product_id,
            quantity,
            candidates = candidates.len(),
            matching = matching.len(),
            "Volume tiers matched"
        );
        Ok(matching)
    }

    /// Prices the best matching tier against `list_price`.
    pub async fn calculate_volume_price(
        &self,
        product_id: i64,
        category_id: Option<i64>,
        quantity: i64,
        list_price: Money,
        as_of: DateTime<Utc>,
    ) -> SourceResult<Option<VolumePrice>> {
        let matching = self
            .find_matching_tiers(product_id, category_id, quantity, as_of)
            .await?;

        Ok(matching
            .first()
            .and_then(|tier| tiers::apply_tier(tier, list_price, self.rounding)))
    }
}
