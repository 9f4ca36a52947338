//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::HarnessConfig;
use crate::executor::GroupSelection;
use crate::models::TestGroup;

/// Integration tests for the metering API
#[derive(Parser, Debug)]
#[command(name = "metering-itest")]
#[command(version)]
#[command(about = "Run integration tests against a live metering API")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the integration test suite
    Run(RunArgs),

    /// List test groups and cases in execution order
    List(ListArgs),

    /// Show or save the resolved configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug, Default)]
pub struct RunArgs {
    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Tenant slug sent with every request
    #[arg(long)]
    pub tenant: Option<String>,

    /// Console log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Retries on transient failures
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Backoff factor in seconds
    #[arg(long)]
    pub backoff_factor: Option<f64>,

    /// Also write debug logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format (table, json, json-pretty, summary)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Save the run report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run only this group
    #[arg(long, conflicts_with = "skip")]
    pub only: Option<String>,

    /// Skip these groups (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl RunArgs {
    /// Layer the flags that were given over `config`
    pub fn apply(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        if let Some(tenant) = &self.tenant {
            config = config.with_tenant(tenant);
        }
        if let Some(level) = &self.log_level {
            config = config.with_log_level(level);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        if let Some(retries) = self.max_retries {
            config = config.with_max_retries(retries);
        }
        if let Some(backoff) = self.backoff_factor {
            config = config.with_backoff_factor(backoff);
        }
        if let Some(path) = &self.log_file {
            config = config.with_log_file(path);
        }
        config
    }

    /// Group selection from `--only` / `--skip`
    pub fn selection(&self) -> Result<GroupSelection, String> {
        let only = self.only.as_deref().map(parse_group).transpose()?;
        let skip = self
            .skip
            .iter()
            .map(|s| parse_group(s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match only {
            Some(group) => GroupSelection::only(group),
            None => GroupSelection::skipping(skip),
        })
    }
}

fn parse_group(name: &str) -> Result<TestGroup, String> {
    TestGroup::from_str(name).ok_or_else(|| {
        format!("Unknown test group: {name} (expected features, meters, events or plans)")
    })
}

/// Arguments for list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show which case each dependent case needs
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Configuration file to start from
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write the resolved configuration here instead of printing it
    #[arg(short, long)]
    pub write: Option<PathBuf>,
}
