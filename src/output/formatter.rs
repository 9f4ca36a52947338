//! Output formatters for test results
//!
//! Provides JSON, Table, and summary output formats.

use serde::Serialize;

use crate::models::{RunSummary, TestOutcome, TestStatus};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct RunJson<'a> {
    summary: &'a RunSummary,
    outcomes: &'a [TestOutcome],
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if self.colorize {
            format!("\x1b[{code}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn status_label(&self, status: TestStatus) -> String {
        let label = format!("{} {}", status.symbol(), status);
        match status {
            TestStatus::Passed => self.paint(&label, "32"),
            TestStatus::Failed | TestStatus::Error => self.paint(&label, "31"),
            TestStatus::Skipped => self.paint(&label, "33"),
        }
    }

    /// Format a single outcome
    pub fn format_outcome(&self, outcome: &TestOutcome) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(outcome).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(outcome).unwrap_or_default(),
            OutputFormat::Table => format!(
                "{:28} {:9} {} [{:>6}ms]",
                outcome.test_name,
                outcome.group.name(),
                self.status_label(outcome.status),
                outcome.duration_ms
            ),
            OutputFormat::Summary => format!(
                "{} {} ({}ms)",
                outcome.status.symbol(),
                outcome.test_name,
                outcome.duration_ms
            ),
        }
    }

    /// Format the run summary together with its outcomes
    pub fn format_summary(&self, summary: &RunSummary, outcomes: &[TestOutcome]) -> String {
        match self.format {
            OutputFormat::Table => self.format_summary_table(summary, outcomes),
            OutputFormat::Json => {
                serde_json::to_string(&RunJson { summary, outcomes }).unwrap_or_default()
            }
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(&RunJson { summary, outcomes }).unwrap_or_default()
            }
            OutputFormat::Summary => self.format_summary_brief(summary, outcomes),
        }
    }

    fn format_summary_table(&self, summary: &RunSummary, outcomes: &[TestOutcome]) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str("║  TEST SUMMARY                                                ║\n");
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for (idx, outcome) in outcomes.iter().enumerate() {
            output.push_str(&format!("  {:2}. {}\n", idx + 1, self.format_outcome(outcome)));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let passed = self.paint(&summary.passed.to_string(), "32");
        let failed = if summary.failed > 0 {
            self.paint(&summary.failed.to_string(), "31")
        } else {
            summary.failed.to_string()
        };
        let errors = if summary.errors > 0 {
            self.paint(&summary.errors.to_string(), "31")
        } else {
            summary.errors.to_string()
        };

        output.push_str(&format!(
            "  Total: {} | Passed: {} | Failed: {} | Errors: {} | Skipped: {}\n",
            summary.total_tests, passed, failed, errors, summary.skipped
        ));
        output.push_str(&format!(
            "  Success Rate: {} | Duration: {:.2}s\n",
            self.format_rate(summary.success_rate),
            summary.total_duration_ms as f64 / 1000.0
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output.push_str(&self.format_failures(outcomes));
        output
    }

    fn format_rate(&self, rate: f64) -> String {
        let text = format!("{rate:.1}%");
        if rate >= 90.0 {
            self.paint(&text, "32")
        } else if rate >= 50.0 {
            self.paint(&text, "33")
        } else {
            self.paint(&text, "31")
        }
    }

    fn format_failures(&self, outcomes: &[TestOutcome]) -> String {
        let failures: Vec<_> = outcomes.iter().filter(|o| o.status.is_failure()).collect();
        if failures.is_empty() {
            return String::new();
        }

        let mut output = String::from("\nFailed Tests:\n");
        for outcome in failures {
            output.push_str(&format!(
                "  - {}: {}\n",
                outcome.test_name,
                outcome.error_message.as_deref().unwrap_or("")
            ));
        }
        output
    }

    fn format_summary_brief(&self, summary: &RunSummary, outcomes: &[TestOutcome]) -> String {
        let mut output = format!(
            "{}/{} passed ({:.1}%) in {:.2}s",
            summary.passed,
            summary.total_tests,
            summary.success_rate,
            summary.total_duration_ms as f64 / 1000.0
        );
        output.push_str(&self.format_failures(outcomes));
        output
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::Table)
    }
}
