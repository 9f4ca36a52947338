//! Request and response shapes for the metering API
//!
//! Every resource body exchanged with the API has an explicit type here;
//! optional fields are skipped when absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Standard success envelope: `{"data": ..., "message": ...}`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body returned by the API
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// Meter aggregation function
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Count,
    Sum,
    Avg,
    UniqueCount,
    Min,
    Max,
}

/// Meter query bucket size
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowSize {
    Minute,
    Hour,
    Day,
}

/// Feature kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Static,
    Metered,
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureType::Static => write!(f, "static"),
            FeatureType::Metered => write!(f, "metered"),
        }
    }
}

/// Plan kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Free,
    Standard,
    Enterprise,
}

// --- meters ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeterRequest {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub event_type: String,
    pub aggregation: Aggregation,
    pub properties: Vec<String>,
    pub populate: bool,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_property: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeterResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub aggregation: Option<Aggregation>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeterQuery {
    pub meter_slug: String,
    pub from: String,
    pub to: String,
    pub window_size: WindowSize,
}

/// Meter query result; only presence of the fields is relied upon
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeterQueryResult {
    pub data: Value,
    pub window_size: Value,
}

// --- features ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub enabled: bool,
    pub priority: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub created_by: String,
    pub config: FeatureConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub updated_by: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureResource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub feature_type: Option<FeatureType>,
    #[serde(default)]
    pub slug: Option<String>,
}

// --- events ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventProperties {
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    pub response_time: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "type")]
    pub event_type: String,
    pub user: String,
    pub organization: String,
    pub timestamp: String,
    pub source: String,
    pub properties: EventProperties,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventBatch {
    pub events: Vec<EventRecord>,
    pub allow_partial_success: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventIngestResult {
    pub success_count: u64,
    #[serde(default)]
    pub failure_count: Option<u64>,
}

// --- plans ---

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(rename = "type")]
    pub plan_type: PlanType,
    pub created_by: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanResource {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanAssignmentRequest {
    pub plan_id_or_slug: String,
    pub valid_from: String,
    pub valid_until: String,
    pub created_by: String,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanAssignmentUpdate {
    pub plan_id_or_slug: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    pub updated_by: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanAssignmentTermination {
    pub plan_id_or_slug: String,
    pub user_id: String,
}
