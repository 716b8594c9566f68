//! # rxprice-engine: Price Resolution for rxprice
//!
//! Decides the single price to charge for a product line, and for whole
//! carts, by consulting every pricing source and applying the fixed
//! selection policy from `rxprice-core`.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          PriceResolver                                  │
//! │                                                                         │
//! │   calculate_price(code, qty, options)                                  │
//! │   calculate_bulk_pricing(lines, options)                               │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ ContractPrice  │  │ PriceRule      │  │ VolumeTierMatcher      │    │
//! │  │ Lookup         │  │ Engine         │  │                        │    │
//! │  │                │  │                │  │ Tightest bracket by    │    │
//! │  │ Fail-open:     │  │ In-process or  │  │ min_qty, rounded by    │    │
//! │  │ error = none   │  │ HTTP, same     │  │ the rounding policy    │    │
//! │  │                │  │ answers        │  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │         │                     │                     │                   │
//! │         └──────────── source traits (sources.rs) ───┘                  │
//! │                               │                                         │
//! │                  SQLite adapters over rxprice-db                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`config`] - `PricingConfig` (TOML file + `RXPRICE_*` environment)
//! - [`contract`] - Contract price lookup
//! - [`error`] - Source and configuration errors
//! - [`resolver`] - Unified price resolver and cart pricing
//! - [`rule_engine`] - In-process and HTTP price rule engines
//! - [`sources`] - Source traits and SQLite adapters
//! - [`volume`] - Volume tier matcher
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rxprice_engine::{rule_engine, PriceResolver, PricingConfig};
//! use rxprice_core::PricingOptions;
//! use rxprice_db::Database;
//!
//! let config = PricingConfig::load(None)?;
//! let db = Database::new(config.db_config()).await?;
//! let rules = rule_engine::from_config(&config, db.clone())?;
//! let resolver = PriceResolver::with_database(db, rules, config.resolver_settings());
//!
//! let result = resolver
//!     .calculate_price("SP001", 12, &PricingOptions::for_customer(1065))
//!     .await?;
//! println!("{} via {}", result.final_price, result.pricing_source.as_str());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod contract;
pub mod error;
pub mod resolver;
pub mod rule_engine;
pub mod sources;
pub mod volume;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{PricingConfig, RuleTransport};
pub use contract::ContractPriceLookup;
pub use error::{ConfigError, ConfigResult, SourceError, SourceResult};
pub use resolver::{PriceResolver, ResolverSettings};
pub use rule_engine::{HttpRuleEngine, InProcessRuleEngine};
pub use sources::{
    ContractPriceSource, PriceRuleEngine, ProductCatalog, SqliteCatalog, SqliteContracts,
    SqliteVolumeTiers, VolumeTierSource,
};
pub use volume::VolumeTierMatcher;
