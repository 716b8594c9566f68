//! # Customer Repository
//!
//! The pricing engine only needs to know whether a customer id is real;
//! every other customer attribute belongs to the CRM screens.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// Repository for customer lookups.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Checks whether an active customer with this id exists.
    pub async fn exists(&self, id: i64) -> DbResult<bool> {
        debug!(customer_id = id, "Checking customer");

        let found: Option<i64> =
            sqlx::query_scalar("SELECT id FROM customers WHERE id = ?1 AND is_active = 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(found.is_some())
    }

    /// Inserts a customer. `id = None` lets SQLite assign one.
    ///
    /// Returns the customer's id.
    pub async fn insert(&self, id: Option<i64>, name: &str, phone: Option<&str>) -> DbResult<i64> {
        debug!(customer_id = ?id, name = %name, "Inserting customer");

        let id = sqlx::query(
            "INSERT INTO customers (id, name, phone, is_active, created_at) VALUES (?1, ?2, ?3, 1, ?4)",
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }
}
