//! Run report persistence
//!
//! A finished run is written as pretty JSON.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::config::HarnessConfig;
use crate::models::{RunSummary, TestOutcome};

/// Everything recorded about one run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run ID
    pub run_id: String,

    /// API under test
    pub base_url: String,

    /// Tenant the run was scoped to
    pub tenant: String,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,

    pub summary: RunSummary,

    /// Outcomes in execution order
    pub outcomes: Vec<TestOutcome>,

    pub environment: EnvironmentInfo,
}

impl RunReport {
    pub fn new(
        config: &HarnessConfig,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        summary: RunSummary,
        outcomes: Vec<TestOutcome>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            base_url: config.base_url.clone(),
            tenant: config.tenant_slug.clone(),
            started_at,
            completed_at,
            summary,
            outcomes,
            environment: EnvironmentInfo::default(),
        }
    }
}

/// Host the harness ran on
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    pub os: String,
    pub arch: String,
    pub tool_version: String,
}

impl Default for EnvironmentInfo {
    fn default() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Writes reports to a fixed path
pub struct ReportWriter {
    path: PathBuf,
}

impl ReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `report`, creating parent directories as needed
    pub fn write(&self, report: &RunReport) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let file = File::create(&self.path).context("Failed to create report file")?;
        serde_json::to_writer_pretty(BufWriter::new(file), report)
            .context("Failed to write report")?;

        info!("Saved test report to {}", self.path.display());
        Ok(())
    }
}
