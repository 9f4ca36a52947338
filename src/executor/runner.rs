//! Test execution runner
//!
//! Runs the test groups in declared order against one API instance and
//! records exactly one outcome per invoked case.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::assertions::CaseResult;
use crate::config::HarnessConfig;
use crate::http::ApiClient;
use crate::models::{FeatureType, RunSummary, TestCase, TestGroup, TestOutcome, TestStatus};
use crate::results::RunReport;
use crate::tests::{CreatedMeter, EventTests, FeatureTests, MeterTests, PlanTests};
use crate::utils::Timer;

const SKIP_REASON: &str = "Skipped by configuration";

/// Lifecycle of a single run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
}

/// Ordered, append-only outcome log for one run
#[derive(Debug)]
pub struct ResultCollector {
    outcomes: Vec<TestOutcome>,
    started: Instant,
    finished: Option<Duration>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self {
            outcomes: Vec::new(),
            started: Instant::now(),
            finished: None,
        }
    }

    pub fn record(&mut self, outcome: TestOutcome) {
        debug!("Recorded: {}", outcome);
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[TestOutcome] {
        &self.outcomes
    }

    /// Freeze the run duration
    pub fn finish(&mut self) {
        self.finished.get_or_insert_with(|| self.started.elapsed());
    }

    /// Recomputed from the outcomes on every call
    pub fn summary(&self) -> RunSummary {
        let elapsed = self.finished.unwrap_or_else(|| self.started.elapsed());
        RunSummary::new(&self.outcomes, elapsed.as_millis() as u64)
    }

    /// FAILED and ERROR outcomes in execution order
    pub fn failures(&self) -> Vec<&TestOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status.is_failure())
            .collect()
    }

    pub fn skip_group(&mut self, group: TestGroup, reason: &str) {
        for case in group.cases() {
            self.record(TestOutcome::skipped(case, reason));
        }
    }

    /// Await one case, classify its result and record the outcome.
    ///
    /// The case's return value is handed back so dependent cases can use it;
    /// a non-null serialization of it is kept as the outcome's details.
    pub async fn run_case<T, F>(&mut self, case: TestCase, future: F) -> Option<T>
    where
        T: Serialize,
        F: Future<Output = CaseResult<T>>,
    {
        info!("Running: {}", case);
        let timer = Timer::start(case.name());
        let result = future.await;
        let elapsed = timer.stop();
        let duration_ms = elapsed.as_millis() as u64;

        match result {
            Ok(value) => {
                info!("✅ {} - PASSED ({:.2}s)", case, elapsed.as_secs_f64());
                let mut outcome = TestOutcome::passed(case, duration_ms);
                match serde_json::to_value(&value) {
                    Ok(Value::Null) => {}
                    Ok(details) => outcome = outcome.with_details(details),
                    Err(e) => debug!("Dropping details for {}: {}", case, e),
                }
                self.record(outcome);
                Some(value)
            }
            Err(e) => {
                let outcome = match e.status() {
                    TestStatus::Failed => {
                        error!("❌ {} - FAILED: {}", case, e);
                        TestOutcome::failed(case, duration_ms, e.to_string())
                    }
                    _ => {
                        error!("💥 {} - ERROR: {}", case, e);
                        TestOutcome::error(case, duration_ms, e.to_string())
                    }
                };
                self.record(outcome);
                None
            }
        }
    }
}

impl Default for ResultCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Which groups a run covers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupSelection {
    /// Run only this group
    pub only: Option<TestGroup>,

    /// Record these groups as skipped
    pub skip: Vec<TestGroup>,
}

impl GroupSelection {
    pub fn only(group: TestGroup) -> Self {
        Self {
            only: Some(group),
            skip: Vec::new(),
        }
    }

    pub fn skipping(groups: impl IntoIterator<Item = TestGroup>) -> Self {
        Self {
            only: None,
            skip: groups.into_iter().collect(),
        }
    }

    pub fn includes(&self, group: TestGroup) -> bool {
        self.only.map_or(true, |only| only == group)
    }

    pub fn skips(&self, group: TestGroup) -> bool {
        self.skip.contains(&group)
    }
}

/// Sequential runner for the metering API suite
pub struct TestRunner {
    config: HarnessConfig,
    client: ApiClient,
    selection: GroupSelection,
    collector: ResultCollector,
    state: RunState,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl TestRunner {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        let client = ApiClient::new(&config).context("Failed to build API client")?;
        Ok(Self {
            config,
            client,
            selection: GroupSelection::default(),
            collector: ResultCollector::new(),
            state: RunState::NotStarted,
            started_at: None,
            completed_at: None,
        })
    }

    pub fn with_selection(mut self, selection: GroupSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn collector(&self) -> &ResultCollector {
        &self.collector
    }

    /// Run every selected group once; a runner cannot be reused
    pub async fn run_all(&mut self) -> Result<RunSummary> {
        if self.state != RunState::NotStarted {
            bail!("Test run already started (state: {:?})", self.state);
        }

        self.state = RunState::Running;
        self.started_at = Some(Utc::now());
        self.collector = ResultCollector::new();

        info!("🚀 Starting Metering API Integration Tests");
        info!("Base URL: {}", self.config.base_url);
        info!("Tenant: {}", self.config.tenant_slug);

        // Delete Meter waits until the events group has run
        let mut live_meter: Option<CreatedMeter> = None;

        for group in TestGroup::all() {
            if !self.selection.includes(group) {
                debug!("Not selected: {} tests", group);
            } else if self.selection.skips(group) {
                info!("Skipping {} tests", group);
                self.collector.skip_group(group, SKIP_REASON);
            } else {
                info!("=== {} Tests ===", group);
                if let Some(meter) = run_group(group, &self.client, &mut self.collector).await {
                    live_meter = Some(meter);
                }
            }

            if group == TestGroup::Events {
                if let Some(meter) = live_meter.take() {
                    info!("=== Meter Cleanup ===");
                    run_meter_cleanup(&meter, &self.client, &mut self.collector).await;
                }
            }
        }

        self.collector.finish();
        self.completed_at = Some(Utc::now());
        self.state = RunState::Completed;
        debug!("Run state: {:?}", self.state);

        let summary = self.collector.summary();
        self.log_summary(&summary);
        Ok(summary)
    }

    fn log_summary(&self, summary: &RunSummary) {
        info!("{}", "=".repeat(60));
        info!("TEST SUMMARY");
        info!("{}", "=".repeat(60));
        info!("Total Tests: {}", summary.total_tests);
        info!("Passed: {}", summary.passed);
        info!("Failed: {}", summary.failed);
        info!("Errors: {}", summary.errors);
        info!("Skipped: {}", summary.skipped);
        info!("Success Rate: {:.1}%", summary.success_rate);
        info!(
            "Total Duration: {:.2}s",
            summary.total_duration_ms as f64 / 1000.0
        );

        let failures = self.collector.failures();
        if !failures.is_empty() {
            info!("Failed Tests:");
            for outcome in failures {
                info!(
                    "  - {}: {}",
                    outcome.test_name,
                    outcome.error_message.as_deref().unwrap_or("")
                );
            }
        }
    }

    /// Report for a completed run
    pub fn report(&self) -> Option<RunReport> {
        let (Some(started_at), Some(completed_at)) = (self.started_at, self.completed_at) else {
            return None;
        };
        Some(RunReport::new(
            &self.config,
            started_at,
            completed_at,
            self.collector.summary(),
            self.collector.outcomes().to_vec(),
        ))
    }
}

/// Runs one group; the meters group hands back the meter still awaiting deletion
async fn run_group(
    group: TestGroup,
    client: &ApiClient,
    collector: &mut ResultCollector,
) -> Option<CreatedMeter> {
    match group {
        TestGroup::Features => run_feature_tests(client, collector).await,
        TestGroup::Meters => return run_meter_tests(client, collector).await,
        TestGroup::Events => run_event_tests(client, collector).await,
        TestGroup::Plans => run_plan_tests(client, collector).await,
    }
    None
}

async fn run_feature_tests(client: &ApiClient, collector: &mut ResultCollector) {
    let tests = FeatureTests::new(client);

    let created = collector
        .run_case(
            TestCase::CreateStaticFeature,
            tests.create_feature(FeatureType::Static),
        )
        .await;
    collector
        .run_case(
            TestCase::CreateMeteredFeature,
            tests.create_feature(FeatureType::Metered),
        )
        .await;
    collector
        .run_case(TestCase::ListFeatures, tests.list_features())
        .await;

    if let Some(created) = created {
        let id = created.feature_id.as_str();
        collector
            .run_case(TestCase::GetFeatureById, tests.get_feature_by_id(id))
            .await;
        collector
            .run_case(TestCase::UpdateFeature, tests.update_feature(id))
            .await;
        collector
            .run_case(TestCase::DeleteFeature, tests.delete_feature(id))
            .await;
    }

    collector
        .run_case(
            TestCase::FeatureValidationErrors,
            tests.feature_validation_errors(),
        )
        .await;
}

async fn run_meter_tests(
    client: &ApiClient,
    collector: &mut ResultCollector,
) -> Option<CreatedMeter> {
    let tests = MeterTests::new(client);

    let created = collector
        .run_case(TestCase::CreateMeter, tests.create_meter())
        .await?;

    collector
        .run_case(TestCase::QueryMeter, tests.query_meter(&created.meter.slug))
        .await;
    Some(created)
}

async fn run_meter_cleanup(meter: &CreatedMeter, client: &ApiClient, collector: &mut ResultCollector) {
    let tests = MeterTests::new(client);
    collector
        .run_case(TestCase::DeleteMeter, tests.delete_meter(&meter.meter_id))
        .await;
}

async fn run_event_tests(client: &ApiClient, collector: &mut ResultCollector) {
    let tests = EventTests::new(client);

    collector
        .run_case(TestCase::PublishSingleEvent, tests.publish_single_event())
        .await;
    collector
        .run_case(TestCase::PublishBatchEvents, tests.publish_batch_events())
        .await;
}

async fn run_plan_tests(client: &ApiClient, collector: &mut ResultCollector) {
    let tests = PlanTests::new(client);

    let Some(created) = collector
        .run_case(TestCase::CreatePlan, tests.create_plan())
        .await
    else {
        return;
    };

    collector
        .run_case(
            TestCase::PlanAssignmentLifecycle,
            tests.plan_assignment_lifecycle(&created.plan_id),
        )
        .await;
    collector
        .run_case(TestCase::DeletePlan, tests.delete_plan(&created.plan_id))
        .await;
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::assertions::{AssertionFailure, CaseError};
    use crate::http::TransportError;
    use crate::tests::fake_api;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_run_case_classifies_results() {
        let mut collector = ResultCollector::new();

        let value = collector
            .run_case(TestCase::CreateMeter, async {
                Ok::<_, CaseError>("meter-1".to_string())
            })
            .await;
        assert_eq!(value.as_deref(), Some("meter-1"));

        let value = collector
            .run_case(TestCase::QueryMeter, async {
                Err::<(), CaseError>(AssertionFailure("data.window_size missing".to_string()).into())
            })
            .await;
        assert!(value.is_none());

        collector
            .run_case(TestCase::DeleteMeter, async {
                Err::<(), CaseError>(TransportError::Timeout(30).into())
            })
            .await;

        let outcomes = collector.outcomes();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].status, TestStatus::Passed);
        assert_eq!(outcomes[0].details, Some(serde_json::json!("meter-1")));
        assert_eq!(outcomes[1].status, TestStatus::Failed);
        assert_eq!(
            outcomes[1].error_message.as_deref(),
            Some("data.window_size missing")
        );
        assert_eq!(outcomes[2].status, TestStatus::Error);
        assert_eq!(collector.failures().len(), 2);
    }

    #[tokio::test]
    async fn test_unit_results_have_no_details() {
        let mut collector = ResultCollector::new();
        collector
            .run_case(TestCase::ListFeatures, async { Ok::<(), CaseError>(()) })
            .await;
        assert!(collector.outcomes()[0].details.is_none());
    }

    #[test]
    fn test_empty_collector_summary() {
        let collector = ResultCollector::new();
        let summary = collector.summary();
        assert!(collector.outcomes().is_empty());
        assert_eq!(summary.total_tests, 0);
        assert_eq!(summary.success_rate, 0.0);
    }

    #[test]
    fn test_group_selection() {
        let all = GroupSelection::default();
        assert!(TestGroup::all().into_iter().all(|g| all.includes(g) && !all.skips(g)));

        let only = GroupSelection::only(TestGroup::Events);
        assert!(only.includes(TestGroup::Events));
        assert!(!only.includes(TestGroup::Plans));

        let skipping = GroupSelection::skipping([TestGroup::Plans]);
        assert!(skipping.includes(TestGroup::Plans));
        assert!(skipping.skips(TestGroup::Plans));
    }

    #[tokio::test]
    async fn test_full_run_against_healthy_api() {
        let server = fake_api::healthy_api().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server)).unwrap();
        assert_eq!(runner.state, RunState::NotStarted);
        assert!(runner.report().is_none());

        let summary = runner.run_all().await.unwrap();

        assert_eq!(runner.state, RunState::Completed);
        assert_eq!(summary.total_tests, 15);
        assert_eq!(summary.passed, 15);
        assert_eq!(summary.success_rate, 100.0);
        assert!(!summary.has_failures());

        let names: Vec<_> = runner
            .collector()
            .outcomes()
            .iter()
            .map(|o| o.test_name.clone())
            .collect();
        let expected: Vec<_> = TestCase::all()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        assert_eq!(names, expected);

        let report = runner.report().unwrap();
        assert_eq!(report.tenant, fake_api::TENANT);
        assert_eq!(report.outcomes.len(), 15);
    }

    fn position(runner: &TestRunner, case: TestCase) -> Option<usize> {
        runner
            .collector()
            .outcomes()
            .iter()
            .position(|o| o.test_name == case.name())
    }

    #[tokio::test]
    async fn test_meter_outlives_event_ingestion() {
        let server = fake_api::healthy_api().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server)).unwrap();
        runner.run_all().await.unwrap();

        let delete = position(&runner, TestCase::DeleteMeter).unwrap();
        let batch = position(&runner, TestCase::PublishBatchEvents).unwrap();
        let create_plan = position(&runner, TestCase::CreatePlan).unwrap();
        assert!(delete > batch, "Delete Meter at {delete}, batch at {batch}");
        assert!(delete < create_plan);
    }

    #[tokio::test]
    async fn test_only_meters_still_deletes_meter() {
        let server = fake_api::healthy_api().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server))
            .unwrap()
            .with_selection(GroupSelection::only(TestGroup::Meters));

        let summary = runner.run_all().await.unwrap();

        assert_eq!(summary.total_tests, 3);
        assert_eq!(summary.passed, 3);
        assert_eq!(position(&runner, TestCase::DeleteMeter), Some(2));
    }

    #[tokio::test]
    async fn test_skipped_events_do_not_strand_meter() {
        let server = fake_api::healthy_api().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server))
            .unwrap()
            .with_selection(GroupSelection::skipping([TestGroup::Events]));

        let summary = runner.run_all().await.unwrap();

        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.passed, 13);
        let delete = position(&runner, TestCase::DeleteMeter).unwrap();
        assert!(delete > position(&runner, TestCase::PublishBatchEvents).unwrap());
        assert_eq!(runner.collector().outcomes()[delete].status, TestStatus::Passed);
    }

    #[tokio::test]
    async fn test_skipped_meters_record_delete_as_skipped() {
        let server = fake_api::healthy_api().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server))
            .unwrap()
            .with_selection(GroupSelection::skipping([TestGroup::Meters]));

        let summary = runner.run_all().await.unwrap();

        assert_eq!(summary.total_tests, 15);
        assert_eq!(summary.skipped, 3);
        let delete = position(&runner, TestCase::DeleteMeter).unwrap();
        assert_eq!(runner.collector().outcomes()[delete].status, TestStatus::Skipped);
    }

    #[tokio::test]
    async fn test_failed_prerequisites_drop_dependents() {
        let server = MockServer::start().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server)).unwrap();

        let summary = runner.run_all().await.unwrap();

        // creates, list, validation and events fail; dependents never run
        assert_eq!(summary.total_tests, 8);
        assert_eq!(summary.failed, 8);
        assert_eq!(summary.success_rate, 0.0);
        assert!(summary.has_failures());

        let outcomes = runner.collector().outcomes();
        assert!(outcomes
            .iter()
            .all(|o| o.test_name != TestCase::QueryMeter.name()));
        assert_eq!(
            outcomes[0].error_message.as_deref(),
            Some("Expected status 201, got 404")
        );
    }

    #[tokio::test]
    async fn test_skipped_group_is_recorded() {
        let server = fake_api::healthy_api().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server))
            .unwrap()
            .with_selection(GroupSelection::skipping([TestGroup::Plans]));

        let summary = runner.run_all().await.unwrap();

        assert_eq!(summary.total_tests, 15);
        assert_eq!(summary.passed, 12);
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.success_rate, 80.0);
        let last = runner.collector().outcomes().last().unwrap();
        assert_eq!(last.error_message.as_deref(), Some(SKIP_REASON));
    }

    #[tokio::test]
    async fn test_only_group_limits_run() {
        let server = fake_api::healthy_api().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server))
            .unwrap()
            .with_selection(GroupSelection::only(TestGroup::Events));

        let summary = runner.run_all().await.unwrap();

        assert_eq!(summary.total_tests, 2);
        assert!(runner
            .collector()
            .outcomes()
            .iter()
            .all(|o| o.group == TestGroup::Events));
    }

    #[tokio::test]
    async fn test_runner_is_single_use() {
        let server = MockServer::start().await;
        let mut runner = TestRunner::new(fake_api::config_for(&server))
            .unwrap()
            .with_selection(GroupSelection::only(TestGroup::Events));

        runner.run_all().await.unwrap();
        assert!(runner.run_all().await.is_err());
        assert_eq!(runner.collector().outcomes().len(), 2);
    }
}
