//! # Selection Policy
//!
//! The one function that decides which candidate price is charged.
//!
//! Candidates are gathered first (concurrently, by the engine), then
//! [`select_price`] applies the priority order in a single pass:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  contract present? ──── yes ───► contract (authoritative, final)       │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  best := list_price                                                    │
//! │  rule price   < best ? → best := rule,   source := rules               │
//! │  volume price < best ? → best := volume, source := volume_tiers        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Selection { final_price: best, source }                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Comparisons are strict, so a volume price equal to the rule price keeps
//! the rule, and a candidate equal to list keeps `list_price`. Discounts
//! from different sources are never stacked.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::rules::RuleMatch;
use crate::tiers::VolumePrice;
use crate::types::PricingSource;

/// Every price the sources produced for one line.
///
/// `None` means the source was disabled, found nothing, or failed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceCandidates {
    pub list_price: Money,
    pub contract_price: Option<Money>,
    pub rule: Option<RuleMatch>,
    pub volume: Option<VolumePrice>,
}

impl PriceCandidates {
    /// Candidates with only the list price.
    pub fn list_only(list_price: Money) -> Self {
        PriceCandidates {
            list_price,
            ..Default::default()
        }
    }

    pub fn rule_price(&self) -> Option<Money> {
        self.rule.as_ref().map(|r| r.final_price)
    }

    pub fn volume_price(&self) -> Option<Money> {
        self.volume.as_ref().map(|v| v.discounted_price)
    }
}

/// The selected price and where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub final_price: Money,
    pub source: PricingSource,
}

/// Applies the priority policy to a set of candidates.
///
/// ```rust
/// use rxprice_core::money::Money;
/// use rxprice_core::policy::{select_price, PriceCandidates};
/// use rxprice_core::types::PricingSource;
///
/// let mut candidates = PriceCandidates::list_only(Money::from_minor(100_000));
/// candidates.contract_price = Some(Money::from_minor(85_000));
///
/// let selection = select_price(&candidates);
/// assert_eq!(selection.final_price.minor(), 85_000);
/// assert_eq!(selection.source, PricingSource::Contract);
/// ```
pub fn select_price(candidates: &PriceCandidates) -> Selection {
    if let Some(contract) = candidates.contract_price {
        return Selection {
            final_price: contract,
            source: PricingSource::Contract,
        };
    }

    let mut best = Selection {
        final_price: candidates.list_price,
        source: PricingSource::ListPrice,
    };

    if let Some(rule_price) = candidates.rule_price() {
        if rule_price < best.final_price {
            best = Selection {
                final_price: rule_price,
                source: PricingSource::Rules,
            };
        }
    }

    if let Some(volume_price) = candidates.volume_price() {
        if volume_price < best.final_price {
            best = Selection {
                final_price: volume_price,
                source: PricingSource::VolumeTiers,
            };
        }
    }

    best
}

// =============================================================================
// Unit Tests
// =============================================================================
