//! Client configuration.
//!
//! One configured base URL replaces the hardcoded backend hosts. Values are
//! read from a TOML file and can be overridden through the environment:
//!
//! ```toml
//! base_url = "http://localhost:8000"
//! payment_order_path = "/payment/create_order"
//! purchase_mode = "checkout"
//! suggestion_debounce_ms = 300
//! stale_responses = "last_resolved_wins"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::CoreError;

pub const ENV_BASE_URL: &str = "MARKET_MASTER_BASE_URL";
pub const ENV_PAYMENT_ORDER_PATH: &str = "MARKET_MASTER_PAYMENT_ORDER_PATH";

/// How credits are bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseMode {
    /// Create an order, hand it to the checkout widget, then re-read the balance.
    Checkout,
    /// Grant credits directly through `/buy_credits`.
    Direct,
}

/// What to do with a history response that resolves after a newer request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleResponsePolicy {
    /// Whatever resolves last overwrites the series.
    LastResolvedWins,
    /// Responses carrying an older sequence number are dropped.
    DiscardStale,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Backend base URL, without a trailing slash.
    pub base_url: String,

    /// Path of the order-creation endpoint (`/payment/create_order` or `/create_order`).
    pub payment_order_path: String,

    pub purchase_mode: PurchaseMode,

    /// Per-request timeout. `None` lets a hung request stay pending.
    pub request_timeout_secs: Option<u64>,

    pub suggestion_debounce_ms: u64,

    /// Minimum trimmed query length before suggestions are fetched.
    pub min_query_len: usize,

    /// Number of chat messages kept in durable storage.
    pub history_limit: usize,

    pub stale_responses: StaleResponsePolicy,

    pub bot_name: String,

    pub default_symbol: String,

    /// Credits bought per purchase when the host does not pick an amount.
    pub credit_package: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            payment_order_path: "/payment/create_order".to_string(),
            purchase_mode: PurchaseMode::Checkout,
            request_timeout_secs: None,
            suggestion_debounce_ms: 300,
            min_query_len: 2,
            history_limit: 30,
            stale_responses: StaleResponsePolicy::LastResolvedWins,
            bot_name: "Maven".to_string(),
            default_symbol: "AAPL".to_string(),
            credit_package: 10,
        }
    }
}

impl DashboardConfig {
    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, CoreError> {
        let config: DashboardConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file, then apply environment overrides.
    /// A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str::<DashboardConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "config file not found; using defaults");
                DashboardConfig::default()
            }
            Err(e) => {
                return Err(CoreError::Config(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from an environment lookup.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(path) = lookup(ENV_PAYMENT_ORDER_PATH).filter(|v| !v.trim().is_empty()) {
            self.payment_order_path = path.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| CoreError::Config(format!("base_url '{}': {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::Config(format!(
                "base_url must be http(s), got '{}'",
                url.scheme()
            )));
        }
        if !self.payment_order_path.starts_with('/') {
            return Err(CoreError::Config(
                "payment_order_path must start with '/'".into(),
            ));
        }
        if self.history_limit == 0 {
            return Err(CoreError::Config("history_limit must be positive".into()));
        }
        if self.credit_package == 0 {
            return Err(CoreError::Config("credit_package must be positive".into()));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn suggestion_debounce(&self) -> Duration {
        Duration::from_millis(self.suggestion_debounce_ms)
    }
}
