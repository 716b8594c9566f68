//! # Domain Types
//!
//! Core domain types used throughout rxprice.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  ContractPrice  │   │  PricingSource  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  customer_id    │   │  contract       │       │
//! │  │  sku / barcode  │   │  product_id     │   │  rules          │       │
//! │  │  category_id    │   │  net_price      │   │  volume_tiers   │       │
//! │  │  sale/base price│   │  is_active      │   │  list_price     │       │
//! │  │  current_stock  │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    TaxRate      │   │    Percent      │   (basis points)            │
//! │  │  825 = 8.25%    │   │  2000 = 20%     │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Volume tiers live in [`crate::tiers`], price rules in [`crate::rules`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1000 bps = 10% (Vietnamese standard VAT), 500 bps = 5% (medicines)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (e.g. `8.25`).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Percent
// =============================================================================

/// A discount percentage in basis points (2000 = 20%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Percent(u32);

impl Percent {
    /// Creates a percentage from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Percent(bps)
    }

    /// Creates a percentage from a decimal value (e.g. `12.5`), rounded to
    /// the nearest basis point. Negative inputs become 0.
    pub fn from_percentage(pct: f64) -> Self {
        Percent((pct * 100.0).round().max(0.0) as u32)
    }

    /// Returns the percentage in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the percentage as a decimal value (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

/// Converts a signed basis-point share into a two-decimal percentage.
///
/// ```rust
/// use rxprice_core::types::bps_to_percentage;
///
/// assert_eq!(bps_to_percentage(1500), 15.0);
/// assert_eq!(bps_to_percentage(3333), 33.33);
/// ```
#[inline]
pub fn bps_to_percentage(bps: i64) -> f64 {
    bps as f64 / 100.0
}

// =============================================================================
// Effective Window
// =============================================================================

/// Checks whether `at` falls inside an inclusive `[from, to]` window.
///
/// A missing bound is unbounded on that side.
pub fn within_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    at: DateTime<Utc>,
) -> bool {
    from.map_or(true, |f| f <= at) && to.map_or(true, |t| at <= t)
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product, as seen by the pricing engine.
///
/// Owned by the catalog; immutable for the duration of one calculation.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Internal identifier.
    pub id: i64,

    /// Product code used at the counter.
    pub sku: String,

    /// Barcode (EAN-13, ...). Scanners send this instead of the SKU.
    pub barcode: Option<String>,

    /// Display name.
    pub name: String,

    /// Category, used for category-scoped tiers and rules.
    pub category_id: Option<i64>,

    /// Catalog base price in minor units.
    pub base_price: Option<i64>,

    /// Current selling price in minor units; overrides `base_price`.
    pub sale_price: Option<i64>,

    /// Current stock level (`None` = not tracked).
    pub current_stock: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The catalog's default selling price: `sale_price`, falling back to
    /// `base_price`, falling back to zero.
    pub fn list_price(&self) -> Money {
        Money::from_minor(self.sale_price.or(self.base_price).unwrap_or(0))
    }

    /// Checks whether `code` identifies this product (SKU or barcode).
    pub fn matches_code(&self, code: &str) -> bool {
        self.sku == code || self.barcode.as_deref() == Some(code)
    }
}

// =============================================================================
// Contract Price
// =============================================================================

/// A negotiated net price for one customer and one product.
///
/// At most one active row exists per `(customer_id, product_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ContractPrice {
    pub id: i64,
    pub customer_id: i64,
    pub product_id: i64,
    /// Net price in minor units.
    pub net_price: i64,
    pub is_active: bool,
}

impl ContractPrice {
    /// Returns the net price as Money.
    #[inline]
    pub fn net_price(&self) -> Money {
        Money::from_minor(self.net_price)
    }
}

// =============================================================================
// Pricing Source
// =============================================================================

/// Which mechanism determined the final price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PricingSource {
    /// Negotiated customer contract (always wins when present).
    Contract,
    /// Price rule from the selected price book.
    Rules,
    /// Quantity-break discount tier.
    VolumeTiers,
    /// No source beat the catalog price.
    ListPrice,
}

impl PricingSource {
    /// Returns the wire tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            PricingSource::Contract => "contract",
            PricingSource::Rules => "rules",
            PricingSource::VolumeTiers => "volume_tiers",
            PricingSource::ListPrice => "list_price",
        }
    }
}

impl Default for PricingSource {
    fn default() -> Self {
        PricingSource::ListPrice
    }
}

impl fmt::Display for PricingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
