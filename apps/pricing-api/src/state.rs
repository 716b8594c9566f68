//! Shared application state.

use std::sync::Arc;

use rxprice_db::Database;
use rxprice_engine::{rule_engine, ConfigResult, InProcessRuleEngine, PriceResolver, PricingConfig};

/// State handed to every handler.
///
/// The `/api/price-rules/evaluate` endpoint is always answered by the
/// local rule engine, even when the resolver itself reaches rules over
/// HTTP.
pub struct AppState {
    pub db: Database,
    pub resolver: PriceResolver,
    pub rules: InProcessRuleEngine,
}

impl AppState {
    /// Wires the resolver and rule engine selected by `config`.
    pub fn from_config(config: &PricingConfig, db: Database) -> ConfigResult<Arc<Self>> {
        let rule_engine = rule_engine::from_config(config, db.clone())?;
        let settings = config.resolver_settings();
        let rules = InProcessRuleEngine::new(db.clone(), settings.rounding);
        let resolver = PriceResolver::with_database(db.clone(), rule_engine, settings);

        Ok(Arc::new(AppState { db, resolver, rules }))
    }
}
