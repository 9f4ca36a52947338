//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "METERING_ITEST";

/// Configuration overrides read from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// METERING_ITEST_BASE_URL
    pub base_url: Option<String>,
    /// METERING_ITEST_TENANT
    pub tenant: Option<String>,
    /// METERING_ITEST_TIMEOUT
    pub timeout: Option<u64>,
    /// METERING_ITEST_MAX_RETRIES
    pub max_retries: Option<u32>,
    /// METERING_ITEST_BACKOFF_FACTOR
    pub backoff_factor: Option<f64>,
    /// METERING_ITEST_LOG_LEVEL
    pub log_level: Option<String>,
    /// METERING_ITEST_LOG_FILE
    pub log_file: Option<String>,
    /// METERING_ITEST_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from the process environment
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(&format!("{ENV_PREFIX}_{name}")).filter(|v| !v.trim().is_empty())
        };

        Self {
            base_url: get("BASE_URL"),
            tenant: get("TENANT"),
            timeout: get("TIMEOUT").and_then(|v| v.parse().ok()),
            max_retries: get("MAX_RETRIES").and_then(|v| v.parse().ok()),
            backoff_factor: get("BACKOFF_FACTOR").and_then(|v| v.parse().ok()),
            log_level: get("LOG_LEVEL"),
            log_file: get("LOG_FILE"),
            config_file: get("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.base_url.is_some()
            || self.tenant.is_some()
            || self.timeout.is_some()
            || self.max_retries.is_some()
            || self.backoff_factor.is_some()
            || self.log_level.is_some()
            || self.log_file.is_some()
            || self.config_file.is_some()
    }
}
