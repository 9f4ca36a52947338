//! Test result models
//!
//! Defines test groups, test cases, outcomes and the run summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource groups, in execution order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestGroup {
    Features,
    Meters,
    Events,
    Plans,
}

impl TestGroup {
    pub fn name(&self) -> &'static str {
        match self {
            TestGroup::Features => "Features",
            TestGroup::Meters => "Meters",
            TestGroup::Events => "Events",
            TestGroup::Plans => "Plans",
        }
    }

    pub fn all() -> Vec<TestGroup> {
        vec![
            TestGroup::Features,
            TestGroup::Meters,
            TestGroup::Events,
            TestGroup::Plans,
        ]
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "features" | "feature" => Some(TestGroup::Features),
            "meters" | "meter" => Some(TestGroup::Meters),
            "events" | "event" => Some(TestGroup::Events),
            "plans" | "plan" => Some(TestGroup::Plans),
            _ => None,
        }
    }

    /// Cases of this group in declared order
    pub fn cases(&self) -> Vec<TestCase> {
        TestCase::all()
            .into_iter()
            .filter(|c| c.group() == *self)
            .collect()
    }
}

impl fmt::Display for TestGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Every scenario the harness knows about
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCase {
    // Features (1-7)
    CreateStaticFeature,
    CreateMeteredFeature,
    ListFeatures,
    GetFeatureById,
    UpdateFeature,
    DeleteFeature,
    FeatureValidationErrors,

    // Meters (8, 9, 12)
    CreateMeter,
    QueryMeter,
    DeleteMeter,

    // Events (10-11)
    PublishSingleEvent,
    PublishBatchEvents,

    // Plans (13-15)
    CreatePlan,
    PlanAssignmentLifecycle,
    DeletePlan,
}

impl TestCase {
    /// Position in the declared run order (1-15)
    pub fn number(&self) -> u8 {
        match self {
            TestCase::CreateStaticFeature => 1,
            TestCase::CreateMeteredFeature => 2,
            TestCase::ListFeatures => 3,
            TestCase::GetFeatureById => 4,
            TestCase::UpdateFeature => 5,
            TestCase::DeleteFeature => 6,
            TestCase::FeatureValidationErrors => 7,
            TestCase::CreateMeter => 8,
            TestCase::QueryMeter => 9,
            TestCase::PublishSingleEvent => 10,
            TestCase::PublishBatchEvents => 11,
            TestCase::DeleteMeter => 12,
            TestCase::CreatePlan => 13,
            TestCase::PlanAssignmentLifecycle => 14,
            TestCase::DeletePlan => 15,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TestCase::CreateStaticFeature => "Create Static Feature",
            TestCase::CreateMeteredFeature => "Create Metered Feature",
            TestCase::ListFeatures => "List Features",
            TestCase::GetFeatureById => "Get Feature by ID",
            TestCase::UpdateFeature => "Update Feature",
            TestCase::DeleteFeature => "Delete Feature",
            TestCase::FeatureValidationErrors => "Feature Validation Errors",
            TestCase::CreateMeter => "Create Meter",
            TestCase::QueryMeter => "Query Meter",
            TestCase::DeleteMeter => "Delete Meter",
            TestCase::PublishSingleEvent => "Publish Single Event",
            TestCase::PublishBatchEvents => "Publish Batch Events",
            TestCase::CreatePlan => "Create Plan",
            TestCase::PlanAssignmentLifecycle => "Plan Assignment Lifecycle",
            TestCase::DeletePlan => "Delete Plan",
        }
    }

    pub fn group(&self) -> TestGroup {
        match self {
            TestCase::CreateStaticFeature
            | TestCase::CreateMeteredFeature
            | TestCase::ListFeatures
            | TestCase::GetFeatureById
            | TestCase::UpdateFeature
            | TestCase::DeleteFeature
            | TestCase::FeatureValidationErrors => TestGroup::Features,
            TestCase::CreateMeter | TestCase::QueryMeter | TestCase::DeleteMeter => {
                TestGroup::Meters
            }
            TestCase::PublishSingleEvent | TestCase::PublishBatchEvents => TestGroup::Events,
            TestCase::CreatePlan | TestCase::PlanAssignmentLifecycle | TestCase::DeletePlan => {
                TestGroup::Plans
            }
        }
    }

    /// Case whose output this one consumes, if any
    pub fn depends_on(&self) -> Option<TestCase> {
        match self {
            TestCase::GetFeatureById | TestCase::UpdateFeature | TestCase::DeleteFeature => {
                Some(TestCase::CreateStaticFeature)
            }
            TestCase::QueryMeter | TestCase::DeleteMeter => Some(TestCase::CreateMeter),
            TestCase::PlanAssignmentLifecycle | TestCase::DeletePlan => Some(TestCase::CreatePlan),
            _ => None,
        }
    }

    /// All cases in declared run order
    pub fn all() -> Vec<TestCase> {
        vec![
            TestCase::CreateStaticFeature,
            TestCase::CreateMeteredFeature,
            TestCase::ListFeatures,
            TestCase::GetFeatureById,
            TestCase::UpdateFeature,
            TestCase::DeleteFeature,
            TestCase::FeatureValidationErrors,
            TestCase::CreateMeter,
            TestCase::QueryMeter,
            TestCase::PublishSingleEvent,
            TestCase::PublishBatchEvents,
            TestCase::DeleteMeter,
            TestCase::CreatePlan,
            TestCase::PlanAssignmentLifecycle,
            TestCase::DeletePlan,
        ]
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Test execution status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
    Error,
    Skipped,
}

impl TestStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            TestStatus::Passed => "✓",
            TestStatus::Failed => "✗",
            TestStatus::Error => "!",
            TestStatus::Skipped => "○",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TestStatus::Failed | TestStatus::Error)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Passed => write!(f, "PASSED"),
            TestStatus::Failed => write!(f, "FAILED"),
            TestStatus::Error => write!(f, "ERROR"),
            TestStatus::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// Outcome of one test case; never mutated once recorded
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestOutcome {
    pub test_name: String,
    pub group: TestGroup,
    pub status: TestStatus,
    pub duration_ms: u64,
    pub error_message: Option<String>,
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl TestOutcome {
    fn new(test_case: TestCase, status: TestStatus, duration_ms: u64) -> Self {
        Self {
            test_name: test_case.name().to_string(),
            group: test_case.group(),
            status,
            duration_ms,
            error_message: None,
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn passed(test_case: TestCase, duration_ms: u64) -> Self {
        Self::new(test_case, TestStatus::Passed, duration_ms)
    }

    pub fn failed(test_case: TestCase, duration_ms: u64, message: impl Into<String>) -> Self {
        Self::new(test_case, TestStatus::Failed, duration_ms).with_message(message)
    }

    pub fn error(test_case: TestCase, duration_ms: u64, message: impl Into<String>) -> Self {
        Self::new(test_case, TestStatus::Error, duration_ms).with_message(message)
    }

    pub fn skipped(test_case: TestCase, reason: impl Into<String>) -> Self {
        Self::new(test_case, TestStatus::Skipped, 0).with_message(reason)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} - {} [{}ms]",
            self.status.symbol(),
            self.test_name,
            self.status,
            self.duration_ms
        )?;
        if let Some(msg) = &self.error_message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

/// Aggregate over a run's outcomes, recomputed on demand
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_tests: usize,
    pub total_duration_ms: u64,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub success_rate: f64,
}

impl RunSummary {
    pub fn new(outcomes: &[TestOutcome], total_duration_ms: u64) -> Self {
        let count = |status: TestStatus| outcomes.iter().filter(|o| o.status == status).count();
        let total_tests = outcomes.len();
        let passed = count(TestStatus::Passed);

        let success_rate = if total_tests == 0 {
            0.0
        } else {
            (passed as f64 / total_tests as f64) * 100.0
        };

        Self {
            total_tests,
            total_duration_ms,
            passed,
            failed: count(TestStatus::Failed),
            errors: count(TestStatus::Error),
            skipped: count(TestStatus::Skipped),
            success_rate,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed + self.errors > 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Passed: {} | Failed: {} | Error: {} | Skipped: {} | Success Rate: {:.1}% | Duration: {:.2}s",
            self.total_tests,
            self.passed,
            self.failed,
            self.errors,
            self.skipped,
            self.success_rate,
            self.total_duration_ms as f64 / 1000.0
        )
    }
}
