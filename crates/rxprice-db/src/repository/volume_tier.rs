//! # Volume Tier Repository
//!
//! Reads the active tiers attached to a product or its category. Bracket,
//! date and precedence checks happen in `rxprice_core::tiers`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use rxprice_core::tiers::{TierScope, VolumeTier};
use rxprice_core::{Money, Percent};

/// Row shape of `volume_tiers`.
#[derive(Debug, sqlx::FromRow)]
struct VolumeTierRow {
    id: i64,
    scope: TierScope,
    target_id: i64,
    min_qty: i64,
    max_qty: Option<i64>,
    discount_percent: Option<f64>,
    discount_amount: Option<i64>,
    effective_from: Option<DateTime<Utc>>,
    effective_to: Option<DateTime<Utc>>,
    is_active: bool,
    notes: Option<String>,
}

impl From<VolumeTierRow> for VolumeTier {
    fn from(row: VolumeTierRow) -> Self {
        VolumeTier {
            id: row.id,
            scope: row.scope,
            target_id: row.target_id,
            min_qty: row.min_qty,
            max_qty: row.max_qty,
            discount_percent: row.discount_percent.map(Percent::from_percentage),
            discount_amount: row.discount_amount.map(Money::from_minor),
            effective_from: row.effective_from,
            effective_to: row.effective_to,
            is_active: row.is_active,
            notes: row.notes,
        }
    }
}

/// Repository for volume tiers.
#[derive(Debug, Clone)]
pub struct VolumeTierRepository {
    pool: SqlitePool,
}

impl VolumeTierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        VolumeTierRepository { pool }
    }

    /// Active tiers where `(scope = sku AND target = product_id)` or
    /// `(scope = category AND target = category_id)`.
    pub async fn active_for(
        &self,
        product_id: i64,
        category_id: Option<i64>,
    ) -> DbResult<Vec<VolumeTier>> {
        debug!(product_id, category_id = ?category_id, "Loading volume tiers");

        let rows = sqlx::query_as::<_, VolumeTierRow>(
            r#"
            SELECT id, scope, target_id, min_qty, max_qty, discount_percent,
                   discount_amount, effective_from, effective_to, is_active, notes
            FROM volume_tiers
            WHERE is_active = 1
              AND ((scope = 'sku' AND target_id = ?1)
                OR (scope = 'category' AND target_id = ?2))
            ORDER BY id
            "#,
        )
        .bind(product_id)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Volume tiers loaded");
        Ok(rows.into_iter().map(VolumeTier::from).collect())
    }

    /// Stores a tier (its `id` is ignored) and returns the new id.
    pub async fn insert(&self, tier: &VolumeTier) -> DbResult<i64> {
        debug!(target_id = tier.target_id, min_qty = tier.min_qty, "Inserting volume tier");

        let id = sqlx::query(
            r#"
            INSERT INTO volume_tiers (
                scope, target_id, min_qty, max_qty, discount_percent, discount_amount,
                effective_from, effective_to, is_active, notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(tier.scope)
        .bind(tier.target_id)
        .bind(tier.min_qty)
        .bind(tier.max_qty)
        .bind(tier.discount_percent.map(|p| p.percentage()))
        .bind(tier.discount_amount.map(|m| m.minor()))
        .bind(tier.effective_from)
        .bind(tier.effective_to)
        .bind(tier.is_active)
        .bind(&tier.notes)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }
}
