//! Test data factory
//!
//! Stateless builders for synthetic request bodies. Natural keys carry a
//! fresh random suffix so repeated runs against a shared environment do not
//! collide.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;
use uuid::Uuid;

use crate::models::{
    Aggregation, EventBatch, EventProperties, EventRecord, FeatureConfig, FeatureRequest,
    FeatureType, FeatureUpdate, MeterQuery, MeterRequest, PlanAssignmentRequest,
    PlanAssignmentTermination, PlanAssignmentUpdate, PlanRequest, PlanType, WindowSize,
};

/// Marker written into `created_by` / `updated_by` / `source`
pub const CREATED_BY: &str = "integration-test";

/// Default assignment validity
pub const DEFAULT_VALIDITY_DAYS: i64 = 30;

/// Look-back window for meter queries
pub const QUERY_LOOKBACK_DAYS: i64 = 7;

/// Status recorded on synthetic `api_call` events
pub const EVENT_STATUS_CODE: u16 = 200;

/// 8 hex characters from a v4 UUID
pub fn unique_suffix() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// RFC 3339 with a `Z` suffix, as the API expects
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn meter() -> MeterRequest {
    let id = unique_suffix();
    MeterRequest {
        name: format!("Test Meter {id}"),
        slug: format!("test-meter-{id}"),
        description: format!("Test meter for integration testing - {id}"),
        event_type: "api_call".to_string(),
        aggregation: Aggregation::Count,
        properties: vec!["user_id".to_string(), "endpoint".to_string()],
        populate: true,
        created_by: CREATED_BY.to_string(),
        value_property: Some("count".to_string()),
    }
}

/// Daily buckets over the last week
pub fn meter_query(meter_slug: &str) -> MeterQuery {
    let now = Utc::now();
    MeterQuery {
        meter_slug: meter_slug.to_string(),
        from: timestamp(now - Duration::days(QUERY_LOOKBACK_DAYS)),
        to: timestamp(now),
        window_size: WindowSize::Day,
    }
}

pub fn feature(feature_type: FeatureType) -> FeatureRequest {
    let id = unique_suffix();
    FeatureRequest {
        name: format!("Test Feature {id}"),
        slug: format!("test-feature-{id}"),
        description: format!("Test feature for integration testing - {id}"),
        feature_type,
        created_by: CREATED_BY.to_string(),
        config: FeatureConfig {
            enabled: true,
            priority: 1,
        },
    }
}

pub fn feature_update() -> FeatureUpdate {
    FeatureUpdate {
        name: Some("Updated Feature Name".to_string()),
        description: Some("Updated feature description for testing".to_string()),
        updated_by: CREATED_BY.to_string(),
    }
}

pub fn plan(plan_type: PlanType) -> PlanRequest {
    let id = unique_suffix();
    PlanRequest {
        name: format!("Test Plan {id}"),
        slug: format!("test-plan-{id}"),
        description: format!("Test plan for integration testing - {id}"),
        plan_type,
        created_by: CREATED_BY.to_string(),
    }
}

pub fn user_id() -> String {
    format!("test-user-{}", unique_suffix())
}

pub fn organization_id() -> String {
    format!("test-org-{}", unique_suffix())
}

/// One usage event; `user` defaults to a fresh synthetic user
pub fn event(event_type: &str, user: Option<&str>) -> EventRecord {
    let mut rng = rand::rng();
    EventRecord {
        event_type: event_type.to_string(),
        user: user.map(str::to_string).unwrap_or_else(user_id),
        organization: organization_id(),
        timestamp: timestamp(Utc::now()),
        source: CREATED_BY.to_string(),
        properties: EventProperties {
            endpoint: "/api/test".to_string(),
            method: "GET".to_string(),
            status_code: EVENT_STATUS_CODE,
            response_time: (rng.random_range(0.01..0.5) * 1000.0_f64).round() / 1000.0,
        },
    }
}

/// `count` fresh `api_call` events
pub fn event_batch(count: usize, allow_partial_success: bool) -> EventBatch {
    EventBatch {
        events: (0..count).map(|_| event("api_call", None)).collect(),
        allow_partial_success,
    }
}

/// Validity window of an assignment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssignmentWindow {
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl AssignmentWindow {
    pub fn starting_at(valid_from: DateTime<Utc>, days: i64) -> Self {
        Self {
            valid_from,
            valid_until: valid_from + Duration::days(days),
        }
    }
}

impl Default for AssignmentWindow {
    fn default() -> Self {
        Self::starting_at(Utc::now(), DEFAULT_VALIDITY_DAYS)
    }
}

/// Assignment valid from now for 30 days
pub fn plan_assignment(plan_id: &str, user_id: &str) -> PlanAssignmentRequest {
    plan_assignment_with_window(plan_id, user_id, AssignmentWindow::default())
}

pub fn plan_assignment_with_window(
    plan_id: &str,
    user_id: &str,
    window: AssignmentWindow,
) -> PlanAssignmentRequest {
    PlanAssignmentRequest {
        plan_id_or_slug: plan_id.to_string(),
        valid_from: timestamp(window.valid_from),
        valid_until: timestamp(window.valid_until),
        created_by: CREATED_BY.to_string(),
        user_id: user_id.to_string(),
    }
}

/// Move the end of an existing assignment
pub fn assignment_extension(
    plan_id: &str,
    user_id: &str,
    valid_until: DateTime<Utc>,
) -> PlanAssignmentUpdate {
    PlanAssignmentUpdate {
        plan_id_or_slug: plan_id.to_string(),
        user_id: user_id.to_string(),
        valid_from: None,
        valid_until: Some(timestamp(valid_until)),
        updated_by: CREATED_BY.to_string(),
    }
}

pub fn assignment_termination(plan_id: &str, user_id: &str) -> PlanAssignmentTermination {
    PlanAssignmentTermination {
        plan_id_or_slug: plan_id.to_string(),
        user_id: user_id.to_string(),
    }
}
