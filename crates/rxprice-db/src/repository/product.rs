//! # Product Repository
//!
//! Catalog reads for the pricing engine, plus the inserts the seed binary
//! and tests need.
//!
//! ## Code Lookup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Counter sends "SP001" (typed) or "8934567000012" (scanned)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE is_active = 1 AND (sku = ?1 OR barcode = ?1)                    │
//! │  ORDER BY sku match first                                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Some(Product) / None                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use rxprice_core::Product;

const PRODUCT_COLUMNS: &str = "id, sku, barcode, name, category_id, base_price, sale_price, \
                               current_stock, is_active, created_at, updated_at";

/// Fields supplied when creating a product.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub sku: String,
    pub barcode: Option<String>,
    pub name: String,
    pub category_id: Option<i64>,
    pub base_price: Option<i64>,
    pub sale_price: Option<i64>,
    pub current_stock: Option<i64>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Finds an active product by SKU or barcode.
    ///
    /// A SKU match is preferred when a code is both one product's SKU and
    /// another's barcode.
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        debug!(code = %code, "Looking up product by code");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND (sku = ?1 OR barcode = ?1) \
             ORDER BY CASE WHEN sku = ?1 THEN 0 ELSE 1 END \
             LIMIT 1"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a product by its ID (active or not).
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it with its generated id.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - SKU or barcode already exists
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO products (
                sku, barcode, name, category_id, base_price, sale_price,
                current_stock, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)
            "#,
        )
        .bind(&product.sku)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(product.category_id)
        .bind(product.base_price)
        .bind(product.sale_price)
        .bind(product.current_stock)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product. Inactive products are never priced.
    pub async fn deactivate(&self, id: i64) -> DbResult<()> {
        debug!(id = id, "Deactivating product");

        let result = sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics and the seeder).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
