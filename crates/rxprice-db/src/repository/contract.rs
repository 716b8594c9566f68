//! # Contract Price Repository
//!
//! Negotiated net prices per (customer, product).
//!
//! A partial unique index guarantees at most one active row per pair, so
//! [`ContractPriceRepository::find_active`] never has to choose.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use rxprice_core::ContractPrice;

/// Repository for contract prices.
#[derive(Debug, Clone)]
pub struct ContractPriceRepository {
    pool: SqlitePool,
}

impl ContractPriceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ContractPriceRepository { pool }
    }

    /// Returns the active contract for a customer and product, if any.
    pub async fn find_active(
        &self,
        customer_id: i64,
        product_id: i64,
    ) -> DbResult<Option<ContractPrice>> {
        debug!(customer_id, product_id, "Looking up contract price");

        let contract = sqlx::query_as::<_, ContractPrice>(
            r#"
            SELECT id, customer_id, product_id, net_price, is_active
            FROM contract_prices
            WHERE customer_id = ?1 AND product_id = ?2 AND is_active = 1
            "#,
        )
        .bind(customer_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contract)
    }

    /// Creates an active contract and returns its id.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - an active contract already exists
    /// * `Err(DbError::ForeignKeyViolation)` - unknown customer or product
    pub async fn insert(&self, customer_id: i64, product_id: i64, net_price: i64) -> DbResult<i64> {
        debug!(customer_id, product_id, net_price, "Inserting contract price");

        let id = sqlx::query(
            r#"
            INSERT INTO contract_prices (customer_id, product_id, net_price, is_active, created_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            "#,
        )
        .bind(customer_id)
        .bind(product_id)
        .bind(net_price)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Ends a contract.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        let result = sqlx::query("UPDATE contract_prices SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ContractPrice", id));
        }

        Ok(())
    }
}
