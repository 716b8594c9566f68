//! # Engine Configuration
//!
//! Configuration for the pricing service and its resolver.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RXPRICE_PORT=9090                                                  │
//! │     RXPRICE_RULE_TRANSPORT=http                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/rxprice/rxprice.toml (Linux)                             │
//! │     ~/Library/Application Support/com.rxprice.rxprice/rxprice.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     port 8080, rxprice.db, in-process rule engine                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # rxprice.toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "rxprice.db"
//! max_connections = 5
//!
//! [pricing]
//! default_price_book_id = "default"
//! default_tax_rate = 0.0        # percent
//! source_timeout_ms = 2000
//! bulk_concurrency = 8
//! rounding_increment = 1        # minor units (VND shops often use 100)
//!
//! [rule_engine]
//! transport = "in_process"      # in_process | http
//! base_url = "http://127.0.0.1:8080"
//! timeout_ms = 2000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use rxprice_core::validation::{validate_price_book_id, validate_tax_rate};
use rxprice_core::{RoundingPolicy, TaxRate, DEFAULT_PRICE_BOOK_ID};
use rxprice_db::DbConfig;

use crate::error::{ConfigError, ConfigResult};
use crate::resolver::ResolverSettings;

// =============================================================================
// Rule Engine Transport
// =============================================================================

/// How the resolver reaches the price rule engine.
///
/// Both transports return identical answers for identical queries; the
/// HTTP endpoint is served by the in-process engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleTransport {
    /// Direct call against the local database.
    #[default]
    InProcess,

    /// `POST {base_url}/api/price-rules/evaluate`.
    Http,
}

impl std::fmt::Display for RuleTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleTransport::InProcess => write!(f, "in_process"),
            RuleTransport::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for RuleTransport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in_process" | "in-process" | "local" => Ok(RuleTransport::InProcess),
            "http" | "remote" => Ok(RuleTransport::Http),
            other => Err(ConfigError::Invalid(format!(
                "Unknown rule transport: '{}'. Valid options: in_process, http",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// `bind_addr:port`, ready for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// SQLite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("rxprice.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Resolver behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Price book used when a request names none.
    #[serde(default = "default_price_book")]
    pub default_price_book_id: String,

    /// Tax percentage used when a request names none.
    #[serde(default)]
    pub default_tax_rate: f64,

    /// Upper bound for each pricing source lookup.
    #[serde(default = "default_timeout_ms")]
    pub source_timeout_ms: u64,

    /// Cart lines priced at once.
    #[serde(default = "default_bulk_concurrency")]
    pub bulk_concurrency: usize,

    /// Rule and tier prices are rounded to a multiple of this (minor units).
    #[serde(default = "default_rounding_increment")]
    pub rounding_increment: i64,
}

fn default_price_book() -> String {
    DEFAULT_PRICE_BOOK_ID.to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_bulk_concurrency() -> usize {
    8
}

fn default_rounding_increment() -> i64 {
    1
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            default_price_book_id: default_price_book(),
            default_tax_rate: 0.0,
            source_timeout_ms: default_timeout_ms(),
            bulk_concurrency: default_bulk_concurrency(),
            rounding_increment: default_rounding_increment(),
        }
    }
}

/// Price rule engine transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleEngineSettings {
    #[serde(default)]
    pub transport: RuleTransport,

    /// Required when `transport = "http"`.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RuleEngineSettings {
    fn default() -> Self {
        Self {
            transport: RuleTransport::default(),
            base_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

// =============================================================================
// Pricing Config
// =============================================================================

/// Complete configuration of the pricing service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub rule_engine: RuleEngineSettings,
}

impl PricingConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (rxprice.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading pricing config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        let pricing = &self.pricing;
        validate_price_book_id(&pricing.default_price_book_id)
            .map_err(|e| ConfigError::Invalid(format!("pricing.{}", e)))?;
        validate_tax_rate(pricing.default_tax_rate)
            .map_err(|e| ConfigError::Invalid(format!("pricing.{}", e)))?;

        if pricing.source_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "pricing.source_timeout_ms must be greater than 0".into(),
            ));
        }
        if pricing.bulk_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "pricing.bulk_concurrency must be at least 1".into(),
            ));
        }
        if pricing.rounding_increment < 1 {
            return Err(ConfigError::Invalid(
                "pricing.rounding_increment must be at least 1".into(),
            ));
        }

        if self.rule_engine.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "rule_engine.timeout_ms must be greater than 0".into(),
            ));
        }

        if self.rule_engine.transport == RuleTransport::Http {
            let base = self.rule_engine.base_url.as_deref().ok_or_else(|| {
                ConfigError::InvalidUrl("rule_engine.base_url is required for the http transport".into())
            })?;
            let url = url::Url::parse(base)?;
            if url.scheme() != "http" && url.scheme() != "https" {
                return Err(ConfigError::InvalidUrl(format!(
                    "Rule engine URL must start with http:// or https://, got: {}",
                    base
                )));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(addr) = std::env::var("RXPRICE_BIND_ADDR") {
            self.server.bind_addr = addr;
        }

        if let Ok(port) = std::env::var("RXPRICE_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(value = %port, "Ignoring invalid RXPRICE_PORT"),
            }
        }

        if let Ok(path) = std::env::var("RXPRICE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(book) = std::env::var("RXPRICE_DEFAULT_PRICE_BOOK") {
            self.pricing.default_price_book_id = book;
        }

        if let Ok(rate) = std::env::var("RXPRICE_TAX_RATE") {
            match rate.parse::<f64>() {
                Ok(r) => self.pricing.default_tax_rate = r,
                Err(_) => warn!(value = %rate, "Ignoring invalid RXPRICE_TAX_RATE"),
            }
        }

        if let Ok(ms) = std::env::var("RXPRICE_SOURCE_TIMEOUT_MS") {
            match ms.parse::<u64>() {
                Ok(v) => self.pricing.source_timeout_ms = v,
                Err(_) => warn!(value = %ms, "Ignoring invalid RXPRICE_SOURCE_TIMEOUT_MS"),
            }
        }

        if let Ok(n) = std::env::var("RXPRICE_BULK_CONCURRENCY") {
            match n.parse::<usize>() {
                Ok(v) => self.pricing.bulk_concurrency = v,
                Err(_) => warn!(value = %n, "Ignoring invalid RXPRICE_BULK_CONCURRENCY"),
            }
        }

        if let Ok(inc) = std::env::var("RXPRICE_ROUNDING_INCREMENT") {
            match inc.parse::<i64>() {
                Ok(v) => self.pricing.rounding_increment = v,
                Err(_) => warn!(value = %inc, "Ignoring invalid RXPRICE_ROUNDING_INCREMENT"),
            }
        }

        if let Ok(transport) = std::env::var("RXPRICE_RULE_TRANSPORT") {
            match transport.parse() {
                Ok(parsed) => {
                    debug!(transport = %transport, "Overriding rule transport from environment");
                    self.rule_engine.transport = parsed;
                }
                Err(e) => warn!("{}", e),
            }
        }

        if let Ok(url) = std::env::var("RXPRICE_RULE_ENGINE_URL") {
            debug!(url = %url, "Overriding rule engine URL from environment");
            self.rule_engine.base_url = Some(url);
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "rxprice", "rxprice")
            .map(|dirs| dirs.config_dir().join("rxprice.toml"))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    /// Database pool configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database.path.clone()).max_connections(self.database.max_connections)
    }

    /// Resolver settings. Call after [`validate`](Self::validate).
    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            default_price_book_id: self.pricing.default_price_book_id.clone(),
            default_tax_rate: validate_tax_rate(self.pricing.default_tax_rate).unwrap_or(TaxRate::zero()),
            source_timeout: Duration::from_millis(self.pricing.source_timeout_ms),
            bulk_concurrency: self.pricing.bulk_concurrency.max(1),
            rounding: RoundingPolicy::new(self.pricing.rounding_increment),
        }
    }

    /// Rule engine request timeout.
    pub fn rule_engine_timeout(&self) -> Duration {
        Duration::from_millis(self.rule_engine.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_parsing() {
        assert_eq!("in_process".parse::<RuleTransport>().unwrap(), RuleTransport::InProcess);
        assert_eq!("local".parse::<RuleTransport>().unwrap(), RuleTransport::InProcess);
        assert_eq!("HTTP".parse::<RuleTransport>().unwrap(), RuleTransport::Http);
        assert!("grpc".parse::<RuleTransport>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = PricingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.pricing.default_price_book_id, "default");
        assert_eq!(config.rule_engine.transport, RuleTransport::InProcess);

        let settings = config.resolver_settings();
        assert_eq!(settings.source_timeout, Duration::from_millis(2000));
        assert_eq!(settings.bulk_concurrency, 8);
        assert_eq!(settings.rounding.increment(), 1);
        assert!(settings.default_tax_rate.is_zero());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PricingConfig::default();

        config.pricing.bulk_concurrency = 0;
        assert!(config.validate().is_err());
        config.pricing.bulk_concurrency = 4;

        config.pricing.default_tax_rate = 120.0;
        assert!(config.validate().is_err());
        config.pricing.default_tax_rate = 10.0;

        config.pricing.rounding_increment = 0;
        assert!(config.validate().is_err());
        config.pricing.rounding_increment = 100;

        // http transport needs a usable base URL
        config.rule_engine.transport = RuleTransport::Http;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
        config.rule_engine.base_url = Some("ws://localhost:8080".into());
        assert!(matches!(config.validate(), Err(ConfigError::InvalidUrl(_))));
        config.rule_engine.base_url = Some("http://localhost:8080".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PricingConfig = toml::from_str(
            r#"
            [pricing]
            rounding_increment = 100
            default_tax_rate = 8.0

            [rule_engine]
            transport = "http"
            base_url = "http://pricing.local:8080"
            "#,
        )
        .unwrap();

        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.pricing.bulk_concurrency, 8);
        assert_eq!(config.rule_engine.transport, RuleTransport::Http);
        assert_eq!(config.resolver_settings().default_tax_rate.bps(), 800);
        assert_eq!(config.resolver_settings().rounding.increment(), 100);
    }

    #[test]
    fn test_toml_serialization() {
        let config = PricingConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[pricing]"));
        assert!(toml_str.contains("transport = \"in_process\""));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("rxprice-test-{}.toml", uuid::Uuid::new_v4()));

        let mut config = PricingConfig::default();
        config.server.port = 9191;
        config.pricing.rounding_increment = 1000;
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = PricingConfig::load(Some(path.clone())).unwrap();
        std::fs::remove_file(&path).ok();

        // Environment may override the port, but not the rounding increment unless set
        if std::env::var("RXPRICE_PORT").is_err() {
            assert_eq!(loaded.server.port, 9191);
        }
        if std::env::var("RXPRICE_ROUNDING_INCREMENT").is_err() {
            assert_eq!(loaded.pricing.rounding_increment, 1000);
        }
    }
}
