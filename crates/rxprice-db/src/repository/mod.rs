//! # Repository Module
//!
//! Database repository implementations for rxprice.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  rxprice-engine SQLite adapters                                        │
//! │       │                                                                 │
//! │       │  db.contracts().find_active(1065, product.id)                  │
//! │       ▼                                                                 │
//! │  Repository (owns the SQL, maps rows to rxprice-core types)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Repositories return rows as stored; effective dates, quantity brackets
//! and precedence are evaluated in rxprice-core.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product lookup by SKU or barcode
//! - [`customer::CustomerRepository`] - Customer existence checks
//! - [`contract::ContractPriceRepository`] - Negotiated net prices
//! - [`volume_tier::VolumeTierRepository`] - Quantity-break tiers
//! - [`price_rule::PriceRuleRepository`] - Price books and rules

pub mod contract;
pub mod customer;
pub mod price_rule;
pub mod product;
pub mod volume_tier;
