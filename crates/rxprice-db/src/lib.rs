//! # rxprice-db: Database Layer for rxprice
//!
//! SQLite access for the catalog and pricing tables, using sqlx for async
//! operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        rxprice Data Flow                                │
//! │                                                                         │
//! │  rxprice-engine SQLite adapters (one per pricing source)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    rxprice-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ Product        │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Customer       │   │ 001_catalog  │  │   │
//! │  │   │               │    │ ContractPrice  │   │ 002_pricing  │  │   │
//! │  │   │               │    │ VolumeTier     │   │              │  │   │
//! │  │   │               │    │ PriceRule      │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (rxprice.db)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rxprice_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("rxprice.db")).await?;
//! let product = db.products().find_by_code("SP001").await?;
//! let tiers = db.volume_tiers().active_for(product.id, product.category_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::contract::ContractPriceRepository;
pub use repository::customer::CustomerRepository;
pub use repository::price_rule::PriceRuleRepository;
pub use repository::product::{NewProduct, ProductRepository};
pub use repository::volume_tier::VolumeTierRepository;
