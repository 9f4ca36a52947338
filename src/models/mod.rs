//! Data models for the metering API harness
//!
//! Typed request/response bodies plus test outcome bookkeeping.

mod resources;
mod test_result;

pub use resources::{
    Aggregation, Envelope, ErrorBody, EventBatch, EventIngestResult,
    EventProperties, EventRecord, FeatureConfig, FeatureRequest, FeatureResource, FeatureType,
    FeatureUpdate, MeterQuery, MeterQueryResult, MeterRequest, MeterResource,
    PlanAssignmentRequest, PlanAssignmentTermination, PlanAssignmentUpdate, PlanRequest,
    PlanResource, PlanType, WindowSize,
};
pub use test_result::{RunSummary, TestCase, TestGroup, TestOutcome, TestStatus};
