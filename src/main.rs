//! Metering API integration tests
//!
//! Drives a live metering/billing API (features, meters, events, plans)
//! through its REST surface and reports a pass/fail summary.
//!
//! ## Features
//!
//! - 15 ordered test cases across 4 resource groups
//! - Retrying HTTP client with exponential backoff
//! - Layered configuration (file, environment, flags)
//! - Table, JSON and summary output; optional JSON run report
//!
//! ## Usage
//!
//! ```bash
//! # Run everything against a local instance
//! metering-itest run --base-url http://localhost:8000 --tenant test-tenant
//!
//! # Only the events group, debug logs to a file
//! metering-itest run --only events --log-file api_tests.log
//!
//! # Skip plans and save a report
//! metering-itest run --skip plans --output report.json
//!
//! # List available tests
//! metering-itest list --detailed
//! ```
//!
//! Exit status: 0 when nothing failed, 1 on any FAILED or ERROR outcome,
//! 2 on invalid configuration.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod assertions;
mod cli;
mod config;
mod executor;
mod factory;
mod http;
mod models;
mod output;
mod results;
mod tests;
mod utils;

use cli::{Args, Command};
use config::{EnvConfig, HarnessConfig};
use executor::{GroupSelection, TestRunner};
use models::{TestCase, TestGroup};
use output::{OutputFormat, ResultFormatter};
use results::ReportWriter;
use utils::Logger;

/// How an invocation ended, mapped onto the process exit status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RunEnd {
    Clean,
    CasesFailed,
    Aborted,
    Misconfigured,
}

impl RunEnd {
    /// `Ok(has_failures)` from a completed run, `Err` from an aborted one
    fn from_run(result: &Result<bool>) -> Self {
        match result {
            Ok(false) => RunEnd::Clean,
            Ok(true) => RunEnd::CasesFailed,
            Err(_) => RunEnd::Aborted,
        }
    }

    fn code(self) -> u8 {
        match self {
            RunEnd::Clean => 0,
            RunEnd::CasesFailed | RunEnd::Aborted => 1,
            RunEnd::Misconfigured => 2,
        }
    }
}

impl From<RunEnd> for ExitCode {
    fn from(end: RunEnd) -> Self {
        ExitCode::from(end.code())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match args.command {
        Command::Run(run_args) => run_tests(run_args).await,
        Command::List(list_args) => {
            list_tests(&list_args);
            ExitCode::SUCCESS
        }
        Command::Config(config_args) => match manage_config(&config_args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Configuration error: {e:#}");
                RunEnd::Misconfigured.into()
            }
        },
    }
}

/// Everything a run needs, checked before any request is sent
struct RunSetup {
    config: HarnessConfig,
    selection: GroupSelection,
    format: OutputFormat,
    logger: Logger,
    output: Option<PathBuf>,
    no_color: bool,
}

fn prepare(args: cli::RunArgs) -> Result<RunSetup> {
    let env = EnvConfig::load();
    let config = args
        .apply(HarnessConfig::resolve(args.config.as_deref(), &env)?)
        .validate()?;

    let selection = args.selection().map_err(|e| anyhow!(e))?;
    let format = OutputFormat::from_str(&args.format)
        .ok_or_else(|| anyhow!("Unknown output format: {}", args.format))?;
    let logger = Logger::from_config(&config)?;

    Ok(RunSetup {
        config,
        selection,
        format,
        logger,
        output: args.output,
        no_color: args.no_color,
    })
}

async fn run_tests(args: cli::RunArgs) -> ExitCode {
    let setup = match prepare(args) {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("Configuration error: {e:#}");
            return RunEnd::Misconfigured.into();
        }
    };

    let result = execute(setup).await;
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
    }
    RunEnd::from_run(&result).into()
}

/// Returns whether any case failed
async fn execute(setup: RunSetup) -> Result<bool> {
    let RunSetup {
        config,
        selection,
        format,
        logger,
        output,
        no_color,
    } = setup;

    let mut runner = TestRunner::new(config)?.with_selection(selection);
    let summary = logger.scope(runner.run_all()).await?;

    let mut formatter = ResultFormatter::new(format);
    if no_color {
        formatter = formatter.no_color();
    }
    println!(
        "{}",
        formatter.format_summary(&summary, runner.collector().outcomes())
    );

    if let (Some(path), Some(report)) = (output, runner.report()) {
        let writer = ReportWriter::new(path);
        tracing::dispatcher::with_default(logger.dispatch(), || writer.write(&report))?;
        eprintln!("Report saved to {}", writer.path().display());
    }

    Ok(summary.has_failures())
}

fn list_tests(args: &cli::ListArgs) {
    println!("\nMetering API Test Cases ({} total)\n", TestCase::all().len());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    for group in TestGroup::all() {
        println!("\n{group} Tests:");
        println!("──────────────────────────────────────────────────────────────────────");

        for test_case in group.cases() {
            match test_case.depends_on().filter(|_| args.detailed) {
                Some(dependency) => println!(
                    "  {:2}. {:28} [needs {}]",
                    test_case.number(),
                    test_case.name(),
                    dependency.name()
                ),
                None => println!("  {:2}. {}", test_case.number(), test_case.name()),
            }
        }
    }

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

fn manage_config(args: &cli::ConfigArgs) -> Result<()> {
    let env = EnvConfig::load();
    if env.has_any() {
        eprintln!("Applying METERING_ITEST_* environment overrides");
    }
    let config = HarnessConfig::resolve(args.config.as_deref(), &env)?.validate()?;

    match &args.write {
        Some(path) => {
            config.save(path)?;
            println!("Configuration written to {}", path.display());
        }
        None => print!("{}", serde_yaml::to_string(&config)?),
    }
    Ok(())
}
