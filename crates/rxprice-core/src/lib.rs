//! # rxprice-core: Pure Pricing Logic for rxprice
//!
//! This crate is the **heart** of rxprice. Every pricing decision is a pure
//! function here, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        rxprice Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 pricing-api (axum HTTP)                         │   │
//! │  │    simulate ──► bulk ──► price-rules/evaluate ──► products      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rxprice-engine (async resolver)                 │   │
//! │  │    contract ∥ rules ∥ volume tiers  →  join  →  policy          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rxprice-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐          │   │
//! │  │   │  money  │  │  tiers  │  │  rules  │  │ policy  │          │   │
//! │  │   │ Money   │  │ matcher │  │evaluator│  │ select  │          │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └─────────┘          │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌──────────┐         │   │
//! │  │   │  types  │  │ result  │  │  cart   │  │validation│         │   │
//! │  │   └─────────┘  └─────────┘  └─────────┘  └──────────┘         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • NO CLOCK                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 rxprice-db (SQLite)                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in minor units, rounding policy
//! - [`types`] - Product, contract price, tax rate, percent, pricing source
//! - [`tiers`] - Volume tier matching and discount math
//! - [`rules`] - Price books, price rules, rule evaluation
//! - [`policy`] - The priority/selection policy
//! - [`result`] - Options and the `PricingResult` document
//! - [`cart`] - Bulk line amounts and cart totals
//! - [`validation`] - Input checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rxprice_core::money::Money;
//! use rxprice_core::policy::{select_price, PriceCandidates};
//! use rxprice_core::types::PricingSource;
//!
//! let candidates = PriceCandidates::list_only(Money::from_minor(100_000));
//! let selection = select_price(&candidates);
//!
//! assert_eq!(selection.final_price.minor(), 100_000);
//! assert_eq!(selection.source, PricingSource::ListPrice);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod policy;
pub mod result;
pub mod rules;
pub mod tiers;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{BulkLine, BulkPricingResult, BulkTotals, CartLine};
pub use error::{CoreResult, PricingError, ValidationError};
pub use money::{Money, RoundingPolicy};
pub use policy::{PriceCandidates, Selection};
pub use result::{CalculationContext, PricingOptions, PricingResult};
pub use rules::{PriceBook, PriceRule, RuleMatch, RuleQuery};
pub use tiers::{VolumePrice, VolumeTier};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Price book used when a request names none.
pub const DEFAULT_PRICE_BOOK_ID: &str = "default";

/// Maximum quantity on a single line.
///
/// Catches keying errors (an extra zero at the counter) without limiting
/// wholesale orders.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;
