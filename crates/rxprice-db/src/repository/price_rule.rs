//! # Price Rule Repository
//!
//! Price books and the rules inside them.
//!
//! ## Adjustment Encoding
//! ```text
//! adjustment     adjustment_value
//! ───────────    ─────────────────────────────
//! percent_off    basis points (1250 = 12.5%)
//! amount_off     minor units off list
//! fixed_price    minor units, replaces list
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use rxprice_core::rules::{Adjustment, PriceBook, PriceRule, RuleScope};
use rxprice_core::{Money, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
enum AdjustmentKind {
    PercentOff,
    AmountOff,
    FixedPrice,
}

/// Row shape of `price_rules`.
#[derive(Debug, sqlx::FromRow)]
struct PriceRuleRow {
    id: i64,
    price_book_id: String,
    name: String,
    priority: i32,
    scope: RuleScope,
    target_id: Option<i64>,
    min_qty: i64,
    adjustment: AdjustmentKind,
    adjustment_value: i64,
    effective_from: Option<DateTime<Utc>>,
    effective_to: Option<DateTime<Utc>>,
    is_active: bool,
}

impl From<PriceRuleRow> for PriceRule {
    fn from(row: PriceRuleRow) -> Self {
        let adjustment = match row.adjustment {
            AdjustmentKind::PercentOff => {
                Adjustment::PercentOff(Percent::from_bps(row.adjustment_value.clamp(0, u32::MAX as i64) as u32))
            }
            AdjustmentKind::AmountOff => Adjustment::AmountOff(Money::from_minor(row.adjustment_value)),
            AdjustmentKind::FixedPrice => Adjustment::FixedPrice(Money::from_minor(row.adjustment_value)),
        };

        PriceRule {
            id: row.id,
            price_book_id: row.price_book_id,
            name: row.name,
            priority: row.priority,
            scope: row.scope,
            target_id: row.target_id,
            min_qty: row.min_qty,
            adjustment,
            effective_from: row.effective_from,
            effective_to: row.effective_to,
            is_active: row.is_active,
        }
    }
}

fn encode_adjustment(adjustment: &Adjustment) -> (AdjustmentKind, i64) {
    match *adjustment {
        Adjustment::PercentOff(pct) => (AdjustmentKind::PercentOff, pct.bps() as i64),
        Adjustment::AmountOff(amount) => (AdjustmentKind::AmountOff, amount.minor()),
        Adjustment::FixedPrice(price) => (AdjustmentKind::FixedPrice, price.minor()),
    }
}

/// Repository for price books and price rules.
#[derive(Debug, Clone)]
pub struct PriceRuleRepository {
    pool: SqlitePool,
}

impl PriceRuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PriceRuleRepository { pool }
    }

    /// Gets a price book by id (active or not).
    pub async fn get_book(&self, id: &str) -> DbResult<Option<PriceBook>> {
        debug!(price_book_id = %id, "Loading price book");

        let book = sqlx::query_as::<_, PriceBook>(
            "SELECT id, name, is_active FROM price_books WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Creates or replaces a price book.
    pub async fn upsert_book(&self, book: &PriceBook) -> DbResult<()> {
        debug!(price_book_id = %book.id, "Upserting price book");

        sqlx::query(
            r#"
            INSERT INTO price_books (id, name, is_active) VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name, is_active = excluded.is_active
            "#,
        )
        .bind(&book.id)
        .bind(&book.name)
        .bind(book.is_active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Active rules of a book, in id order.
    pub async fn active_rules_for_book(&self, price_book_id: &str) -> DbResult<Vec<PriceRule>> {
        debug!(price_book_id = %price_book_id, "Loading price rules");

        let rows = sqlx::query_as::<_, PriceRuleRow>(
            r#"
            SELECT id, price_book_id, name, priority, scope, target_id, min_qty,
                   adjustment, adjustment_value, effective_from, effective_to, is_active
            FROM price_rules
            WHERE price_book_id = ?1 AND is_active = 1
            ORDER BY id
            "#,
        )
        .bind(price_book_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Price rules loaded");
        Ok(rows.into_iter().map(PriceRule::from).collect())
    }

    /// Stores a rule (its `id` is ignored) and returns the new id.
    pub async fn insert(&self, rule: &PriceRule) -> DbResult<i64> {
        debug!(price_book_id = %rule.price_book_id, name = %rule.name, "Inserting price rule");

        let (kind, value) = encode_adjustment(&rule.adjustment);

        let id = sqlx::query(
            r#"
            INSERT INTO price_rules (
                price_book_id, name, priority, scope, target_id, min_qty,
                adjustment, adjustment_value, effective_from, effective_to, is_active
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&rule.price_book_id)
        .bind(&rule.name)
        .bind(rule.priority)
        .bind(rule.scope)
        .bind(rule.target_id)
        .bind(rule.min_qty)
        .bind(kind)
        .bind(value)
        .bind(rule.effective_from)
        .bind(rule.effective_to)
        .bind(rule.is_active)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }
}
