//! Configuration module
//!
//! Handles loading, layering and validating harness settings.

mod env;

pub use env::EnvConfig;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::utils::LogLevel;

/// Configuration validation errors
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Base URL must not be empty")]
    EmptyBaseUrl,

    #[error("Base URL must start with http:// or https://: {0}")]
    InvalidScheme(String),

    #[error("Tenant slug must not be empty")]
    EmptyTenant,

    #[error("Timeout must be at least one second")]
    ZeroTimeout,

    #[error("Backoff factor must be a finite, non-negative number: {0}")]
    InvalidBackoff(f64),

    #[error("Unknown log level: {0}")]
    UnknownLogLevel(String),
}

/// Harness configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Tenant identifier sent with every request
    pub tenant_slug: String,

    /// Per-attempt HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Retries after the first attempt on transient failures
    pub max_retries: u32,

    /// Seconds; retry n sleeps backoff_factor * 2^n
    pub backoff_factor: f64,

    /// Console log verbosity
    pub log_level: String,

    /// Optional file receiving debug-level records
    pub log_file: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            tenant_slug: "test-tenant".to_string(),
            timeout_secs: 30,
            max_retries: 3,
            backoff_factor: 0.3,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Defaults, then the config file (`path`, else the one named by the
    /// environment), then environment overrides
    pub fn resolve(path: Option<&Path>, env: &EnvConfig) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env.config_file.as_ref().map(PathBuf::from));
        let base = match path {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        Ok(base.with_env(env))
    }

    /// Apply environment variable overrides
    pub fn with_env(mut self, env: &EnvConfig) -> Self {
        if let Some(url) = &env.base_url {
            self = self.with_base_url(url);
        }
        if let Some(tenant) = &env.tenant {
            self = self.with_tenant(tenant);
        }
        if let Some(timeout) = env.timeout {
            self = self.with_timeout(timeout);
        }
        if let Some(retries) = env.max_retries {
            self = self.with_max_retries(retries);
        }
        if let Some(backoff) = env.backoff_factor {
            self = self.with_backoff_factor(backoff);
        }
        if let Some(level) = &env.log_level {
            self = self.with_log_level(level);
        }
        if let Some(file) = &env.log_file {
            self = self.with_log_file(file);
        }
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_slug = tenant.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Validate and normalize; the result is the immutable run configuration
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        let trimmed = self.base_url.trim().trim_end_matches('/').to_string();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ConfigError::InvalidScheme(trimmed));
        }
        self.base_url = trimmed;

        if self.tenant_slug.trim().is_empty() {
            return Err(ConfigError::EmptyTenant);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if !self.backoff_factor.is_finite() || self.backoff_factor < 0.0 {
            return Err(ConfigError::InvalidBackoff(self.backoff_factor));
        }
        if LogLevel::from_str(&self.log_level).is_none() {
            return Err(ConfigError::UnknownLogLevel(self.log_level.clone()));
        }

        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parsed console log level, falling back to info
    pub fn level(&self) -> LogLevel {
        LogLevel::from_str(&self.log_level).unwrap_or(LogLevel::Info)
    }
}

/// Check if path is a YAML file
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
