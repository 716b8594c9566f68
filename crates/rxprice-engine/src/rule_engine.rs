//! # Price Rule Engine Adapters
//!
//! Two transports for the same contract:
//!
//! ```text
//! RuleQuery {price_book_id, sku, qty, when}
//!      │
//!      ├── InProcessRuleEngine ──► price_books / price_rules (SQLite)
//!      │                           └─► rxprice_core::rules::evaluate_rules
//!      │
//!      └── HttpRuleEngine ──► POST {base}/api/price-rules/evaluate
//!                             (served by an InProcessRuleEngine)
//!      │
//!      ▼
//! Option<RuleMatch> {final_price, applied_rule_id?, applied_reason?}
//! ```
//!
//! The HTTP body is the JSON form of [`RuleQuery`]; the response is a
//! [`RuleMatch`] or `null`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use rxprice_core::rules::evaluate_rules;
use rxprice_core::{RoundingPolicy, RuleMatch, RuleQuery};
use rxprice_db::Database;

use crate::config::{PricingConfig, RuleTransport};
use crate::error::{ConfigError, ConfigResult, SourceError, SourceResult};
use crate::sources::PriceRuleEngine;

/// Path of the evaluation endpoint, relative to the service root.
pub const EVALUATE_PATH: &str = "api/price-rules/evaluate";

/// Builds the rule engine selected by `rule_engine.transport`.
pub fn from_config(config: &PricingConfig, db: Database) -> ConfigResult<Arc<dyn PriceRuleEngine>> {
    let rounding = config.resolver_settings().rounding;

    match config.rule_engine.transport {
        RuleTransport::InProcess => Ok(Arc::new(InProcessRuleEngine::new(db, rounding))),
        RuleTransport::Http => {
            let base_url = config.rule_engine.base_url.as_deref().ok_or_else(|| {
                ConfigError::InvalidUrl("rule_engine.base_url is required for the http transport".into())
            })?;
            Ok(Arc::new(HttpRuleEngine::new(base_url, config.rule_engine_timeout())?))
        }
    }
}

// =============================================================================
// In-Process
// =============================================================================

/// Evaluates price books stored in the local database.
#[derive(Debug, Clone)]
pub struct InProcessRuleEngine {
    db: Database,
    rounding: RoundingPolicy,
}

impl InProcessRuleEngine {
    pub fn new(db: Database, rounding: RoundingPolicy) -> Self {
        Self { db, rounding }
    }
}

#[async_trait]
impl PriceRuleEngine for InProcessRuleEngine {
    async fn evaluate(&self, query: &RuleQuery) -> SourceResult<Option<RuleMatch>> {
        let Some(book) = self.db.price_rules().get_book(&query.price_book_id).await? else {
            debug!(price_book_id = %query.price_book_id, "Unknown price book");
            return Ok(None);
        };

        let Some(product) = self.db.products().find_by_code(&query.sku).await? else {
            debug!(sku = %query.sku, "Unknown SKU for rule evaluation");
            return Ok(None);
        };

        let rules = self.db.price_rules().active_rules_for_book(&book.id).await?;
        let matched = evaluate_rules(&book, &rules, &product, query.qty, query.when, self.rounding);

        debug!(
            price_book_id = %book.id,
            sku = %query.sku,
            qty = query.qty,
            rule_id = ?matched.as_ref().and_then(|m| m.applied_rule_id),
            "Price rules evaluated"
        );
        Ok(matched)
    }
}

// =============================================================================
// HTTP
// =============================================================================

/// Client for a remote price rule engine.
#[derive(Debug, Clone)]
pub struct HttpRuleEngine {
    client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpRuleEngine {
    /// Creates a client for the service at `base_url` (e.g.
    /// `http://pricing.local:8080`).
    pub fn new(base_url: &str, timeout: Duration) -> ConfigResult<Self> {
        let mut base = Url::parse(base_url)?;
        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "Rule engine URL must start with http:// or https://, got: {}",
                base_url
            )));
        }
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(EVALUATE_PATH)?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl PriceRuleEngine for HttpRuleEngine {
    async fn evaluate(&self, query: &RuleQuery) -> SourceResult<Option<RuleMatch>> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SourceError::Timeout(self.timeout)
                } else {
                    SourceError::from(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SourceError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        let matched: Option<RuleMatch> = response.json().await?;
        Ok(matched)
    }
}
