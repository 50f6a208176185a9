//! Runtime configuration.
//!
//! Defaults are usable as-is; environment variables or a JSON document override them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::unit_of_work::RetryPolicy;

pub const ENV_CONFLICT_RETRIES: &str = "STOCKKEEP_CONFLICT_RETRIES";
pub const ENV_LOG: &str = "STOCKKEEP_LOG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockKeepConfig {
    /// Times a unit of work is re-run after a concurrency conflict.
    pub conflict_retries: u32,
    /// Default tracing filter directive (`RUST_LOG` still takes precedence).
    pub log_filter: String,
}

impl Default for StockKeepConfig {
    fn default() -> Self {
        Self {
            conflict_retries: 1,
            log_filter: "info".to_string(),
        }
    }
}

impl StockKeepConfig {
    /// Defaults overridden by `STOCKKEEP_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CONFLICT_RETRIES) {
            config.conflict_retries =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_CONFLICT_RETRIES,
                        value: raw.clone(),
                    })?;
        }
        if let Some(raw) = lookup(ENV_LOG) {
            if !raw.trim().is_empty() {
                config.log_filter = raw.trim().to_string();
            }
        }

        Ok(config)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.conflict_retries)
    }
}
