use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use validator::Validate;

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const CONFIG_DIR: &str = "config";
const DEFAULT_ORDER_NUMBER_PREFIX: &str = "ORD";
const DEFAULT_ORDER_NUMBER_WIDTH: usize = 4;
const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;
const DEFAULT_RECENT_MOVEMENTS_LIMIT: u64 = 5;
const DEFAULT_PAGE_SIZE: u64 = 10;

/// Application configuration with validation.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Deployment environment name
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Fixed prefix for generated order numbers (`PREFIX-NNNN`)
    #[validate(length(min = 1, max = 10))]
    #[serde(default = "default_order_number_prefix")]
    pub order_number_prefix: String,

    /// Zero-padded width of the numeric order number suffix
    #[validate(range(min = 1, max = 10))]
    #[serde(default = "default_order_number_width")]
    pub order_number_width: usize,

    /// Products with stock below this count as "low stock"
    #[validate(range(min = 0))]
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: i32,

    /// How many recent stock movements the dashboard shows
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_recent_movements_limit")]
    pub recent_movements_limit: u64,

    /// Default page size for list queries
    #[validate(range(min = 1, max = 500))]
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_order_number_prefix() -> String {
    DEFAULT_ORDER_NUMBER_PREFIX.to_string()
}

fn default_order_number_width() -> usize {
    DEFAULT_ORDER_NUMBER_WIDTH
}

fn default_low_stock_threshold() -> i32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_recent_movements_limit() -> u64 {
    DEFAULT_RECENT_MOVEMENTS_LIMIT
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            log_level: default_log_level(),
            environment: default_environment(),
            order_number_prefix: default_order_number_prefix(),
            order_number_width: default_order_number_width(),
            low_stock_threshold: default_low_stock_threshold(),
            recent_movements_limit: default_recent_movements_limit(),
            default_page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from layered sources: `config/default`, then the
    /// environment-specific file, then `APP_`-prefixed environment
    /// variables. Later sources win.
    pub fn load() -> Result<Self, ConfigError> {
        let run_env = env::var("RUN_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

        let config: AppConfig = Config::builder()
            .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
            .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()?;

        config
            .validate()
            .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_thresholds() {
        let config = AppConfig::default();
        assert_eq!(config.order_number_prefix, "ORD");
        assert_eq!(config.order_number_width, 4);
        assert_eq!(config.low_stock_threshold, 10);
        assert_eq!(config.recent_movements_limit, 5);
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
