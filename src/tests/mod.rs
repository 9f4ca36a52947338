//! Metering API test groups
//!
//! One module per resource; each case returns a typed `CaseResult`.
//!
//! ## Test Groups
//!
//! ### Features (1-7)
//! - Create Static / Metered Feature
//! - List Features
//! - Get, Update, Delete Feature (needs the static feature)
//! - Feature Validation Errors
//!
//! ### Meters (8, 9, 12)
//! - Create Meter
//! - Query Meter (needs the meter)
//! - Delete Meter, deferred until the events group has run
//!
//! ### Events (10-11)
//! - Publish Single Event
//! - Publish Batch Events
//!
//! ### Plans (13-15)
//! - Create Plan
//! - Plan Assignment Lifecycle, Delete Plan (need the plan)



pub use events::EventTests;
pub use features::FeatureTests;
pub use meters::{CreatedMeter, MeterTests};
pub use plans::PlanTests;

#[cfg(test)]
mod scenario_tests {
    use super::fake_api::{self, FEATURE_ID, METER_ID, PLAN_ID};
    use super::*;
    use crate::models::{FeatureType, TestStatus};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_feature_round_trip() {
        let server = MockServer::start().await;
        fake_api::mount_features(&server).await;
        let client = fake_api::client_for(&server);
        let tests = FeatureTests::new(&client);

        let created = tests.create_feature(FeatureType::Static).await.unwrap();
        assert_eq!(created.feature_id, FEATURE_ID);
        assert_eq!(created.feature.feature_type, FeatureType::Static);

        assert_eq!(tests.list_features().await.unwrap(), 1);
        tests.get_feature_by_id(FEATURE_ID).await.unwrap();
        tests.update_feature(FEATURE_ID).await.unwrap();
        tests.delete_feature(FEATURE_ID).await.unwrap();
    }

    #[tokio::test]
    async fn test_feature_validation_rejections_pass() {
        let server = MockServer::start().await;
        fake_api::mount_features(&server).await;
        let client = fake_api::client_for(&server);

        FeatureTests::new(&client)
            .feature_validation_errors()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_feature_validation_fails_when_api_accepts_garbage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/features"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "data": { "id": "x" } })))
            .mount(&server)
            .await;
        let client = fake_api::client_for(&server);

        let err = FeatureTests::new(&client)
            .feature_validation_errors()
            .await
            .unwrap_err();
        assert_eq!(err.status(), TestStatus::Failed);
        assert_eq!(err.to_string(), "Expected error status 400, got 201");
    }

    #[tokio::test]
    async fn test_create_feature_name_mismatch_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/features"))
            .respond_with(ResponseTemplate::new(201).set_body_json(
                json!({ "data": { "id": "f-9", "name": "Someone Else", "type": "static" } }),
            ))
            .mount(&server)
            .await;
        let client = fake_api::client_for(&server);

        let err = FeatureTests::new(&client)
            .create_feature(FeatureType::Static)
            .await
            .unwrap_err();
        assert_eq!(err.status(), TestStatus::Failed);
        assert!(err.to_string().starts_with("data.name"));
    }

    #[tokio::test]
    async fn test_list_features_requires_array() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/features"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
            .mount(&server)
            .await;
        let client = fake_api::client_for(&server);

        let err = FeatureTests::new(&client).list_features().await.unwrap_err();
        assert_eq!(err.status(), TestStatus::Failed);
    }

    #[tokio::test]
    async fn test_meter_scenario() {
        let server = MockServer::start().await;
        fake_api::mount_meters(&server).await;
        let client = fake_api::client_for(&server);
        let tests = MeterTests::new(&client);

        let created = tests.create_meter().await.unwrap();
        assert_eq!(created.meter_id, METER_ID);

        let result = tests.query_meter(&created.meter.slug).await.unwrap();
        assert_eq!(result.window_size, json!("day"));

        tests.delete_meter(METER_ID).await.unwrap();
    }

    #[tokio::test]
    async fn test_meter_query_missing_window_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/meters/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "data": [] } })))
            .mount(&server)
            .await;
        let client = fake_api::client_for(&server);

        let err = MeterTests::new(&client)
            .query_meter("test-meter-1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), TestStatus::Failed);
    }

    #[tokio::test]
    async fn test_delete_meter_still_present_fails() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v1/meters/m-1"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/meters/m-1"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let client = fake_api::client_for(&server);

        let err = MeterTests::new(&client).delete_meter("m-1").await.unwrap_err();
        assert_eq!(err.to_string(), "Expected error status 404, got 200");
    }

    #[tokio::test]
    async fn test_events_use_tenant_header() {
        let server = MockServer::start().await;
        fake_api::mount_events(&server).await;
        let client = fake_api::client_for(&server);
        let tests = EventTests::new(&client);

        assert_eq!(tests.publish_single_event().await.unwrap().success_count, 1);
        assert_eq!(tests.publish_batch_events().await.unwrap().success_count, 5);
    }

    #[tokio::test]
    async fn test_partial_event_ingest_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/events"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "data": { "success_count": 3 } })),
            )
            .mount(&server)
            .await;
        let client = fake_api::client_for(&server);

        let err = EventTests::new(&client)
            .publish_batch_events()
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "data.success_count: expected 5, got 3");
    }

    #[tokio::test]
    async fn test_plan_lifecycle() {
        let server = MockServer::start().await;
        fake_api::mount_plans(&server).await;
        let client = fake_api::client_for(&server);
        let tests = PlanTests::new(&client);

        let created = tests.create_plan().await.unwrap();
        assert_eq!(created.plan_id, PLAN_ID);

        let lifecycle = tests.plan_assignment_lifecycle(PLAN_ID).await.unwrap();
        assert_eq!(lifecycle.assignment_id, "asg-1");
        assert!(lifecycle.user_id.starts_with("test-user-"));

        tests.delete_plan(PLAN_ID).await.unwrap();
    }

    #[tokio::test]
    async fn test_assignment_listing_filters_by_plan() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/plans/assignments"))
            .and(query_param("plan_id_or_slug", PLAN_ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
            .expect(1)
            .mount(&server)
            .await;
        fake_api::mount_plans(&server).await;
        let client = fake_api::client_for(&server);

        PlanTests::new(&client)
            .plan_assignment_lifecycle(PLAN_ID)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_assignment_without_id_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/plans/assignments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true })))
            .mount(&server)
            .await;
        let client = fake_api::client_for(&server);

        let err = PlanTests::new(&client)
            .plan_assignment_lifecycle(PLAN_ID)
            .await
            .unwrap_err();
        assert_eq!(err.status(), TestStatus::Error);
    }

    #[tokio::test]
    async fn test_server_errors_surface_as_transport_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        let client = fake_api::client_for(&server);

        let err = PlanTests::new(&client).create_plan().await.unwrap_err();
        assert_eq!(err.status(), TestStatus::Error);
    }
}
