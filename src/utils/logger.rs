//! Logging utilities
//!
//! Builds a per-run tracing dispatcher instead of a process-wide subscriber,
//! so repeated runs in one process each keep their own sinks.

use anyhow::{Context, Result};
use std::fs::File;
use std::future::Future;
use std::path::Path;
use std::sync::Mutex;
use tracing::instrument::{WithDispatch, WithSubscriber};
use tracing::Dispatch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::config::HarnessConfig;

/// Records from this crate only; transport crates stay quiet
const LOG_TARGET: &str = "metering_itest";

/// Log level configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }
}

/// Explicitly constructed log sink handed down to a run
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Console sink at `level`, plus a debug-level file sink when `log_file` is given
    pub fn new(level: LogLevel, log_file: Option<&Path>) -> Result<Self> {
        let console = fmt::layer()
            .with_target(false)
            .compact()
            .with_filter(EnvFilter::new(format!("{LOG_TARGET}={}", level.as_str())));

        let file = match log_file {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create log file: {}", path.display()))?;
                let layer = fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(format!("{LOG_TARGET}=debug")));
                Some(layer)
            }
            None => None,
        };

        let subscriber = tracing_subscriber::registry().with(console).with(file);

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
        })
    }

    pub fn from_config(config: &HarnessConfig) -> Result<Self> {
        Self::new(config.level(), config.log_file.as_deref())
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `future` with this logger as its only sink
    pub fn scope<F: Future>(&self, future: F) -> WithDispatch<F> {
        future.with_subscriber(self.dispatch.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::from_str("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::from_str("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::from_str("unknown"), None);
    }

    #[test]
    fn test_file_sink_captures_debug() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("api_tests.log");

        let logger = Logger::new(LogLevel::Error, Some(&path)).unwrap();
        tracing::dispatcher::with_default(logger.dispatch(), || {
            tracing::debug!("request body captured");
        });

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("request body captured"));
    }

    #[test]
    fn test_separate_loggers_do_not_share_sinks() {
        let dir = tempdir().unwrap();
        let first_path = dir.path().join("first.log");
        let second_path = dir.path().join("second.log");

        let first = Logger::new(LogLevel::Error, Some(&first_path)).unwrap();
        let second = Logger::new(LogLevel::Error, Some(&second_path)).unwrap();

        tracing::dispatcher::with_default(first.dispatch(), || {
            tracing::info!("only in first");
        });
        tracing::dispatcher::with_default(second.dispatch(), || {
            tracing::info!("only in second");
        });

        let first_log = std::fs::read_to_string(&first_path).unwrap();
        let second_log = std::fs::read_to_string(&second_path).unwrap();
        assert!(first_log.contains("only in first"));
        assert!(!first_log.contains("only in second"));
        assert!(second_log.contains("only in second"));
    }

    #[test]
    fn test_missing_log_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("api_tests.log");
        assert!(Logger::new(LogLevel::Info, Some(&path)).is_err());
    }
}
