//! Integration tests for the engine wired to real HTTP adapters.
//!
//! Each test stands up a wiremock directory, builds the same scheduler the
//! binary builds (HTTP directory, metrics, sink) and drives it through
//! triggers or the operational router via `tower::ServiceExt::oneshot`. No
//! live directory or server is needed.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveDateTime};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use proximity_notifier::{
    api::{create_router, ApiState},
    clock::ManualClock,
    metrics::AppMetrics,
    notify::MemorySink,
    proximity::{
        types::{CycleOutcome, CycleReport, TriggerResult},
        Coordinate, ProximityConfig, StatusKind,
    },
    scheduler::{Scheduler, TriggerSource},
    services::directory::HttpDirectory,
};

// ---- Helpers ----------------------------------------------------------------

/// Directory payload in the loose shape the real service returns: string ids,
/// string coordinates, one broken record.
const DIRECTORY_BODY: &str = r#"[
    {
        "id": "1",
        "name": "Riverside Library",
        "address": "1 River Rd",
        "hours": "Mon: 09:00 AM - 05:00 PM, Tue: 09:00 AM - 05:00 PM",
        "latitude": "0.00027",
        "longitude": "0"
    },
    {
        "id": 2,
        "name": "Hilltop Gym",
        "hours": "Mon: 06:00 AM - 10:00 PM",
        "latitude": 0.05,
        "longitude": 0.05
    },
    {
        "id": 3,
        "name": "Corner Cafe",
        "hours": "Mon: 09:00 AM - 09:30 AM",
        "latitude": "not-a-number",
        "longitude": "0"
    },
    {
        "id": 4,
        "name": "Night Market",
        "hours": "Mon: 06:00 PM - 11:00 PM",
        "latitude": 0.0001,
        "longitude": 0.0001
    }
]"#;

const HERE: Coordinate = Coordinate {
    latitude: 0.0,
    longitude: 0.0,
};

// 2024-01-01 is a Monday.
fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

async fn mount_directory(server: &MockServer, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/points-of-interest"))
        .respond_with(template)
        .mount(server)
        .await;
}

struct TestEngine {
    scheduler: Arc<Scheduler>,
    sink: Arc<MemorySink>,
    metrics: Arc<AppMetrics>,
}

fn build_engine(server: &MockServer, config: ProximityConfig, local_now: NaiveDateTime) -> TestEngine {
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let directory = HttpDirectory::new(server.uri(), config.directory_timeout)
        .unwrap()
        .with_metrics(metrics.clone());
    let sink = Arc::new(MemorySink::new());

    let scheduler = Scheduler::new(config, Arc::new(directory), sink.clone())
        .with_clock(Arc::new(ManualClock::starting_at(local_now)))
        .with_metrics(metrics.clone());

    TestEngine {
        scheduler: Arc::new(scheduler),
        sink,
        metrics,
    }
}

fn ran(result: TriggerResult) -> CycleReport {
    match result {
        TriggerResult::Ran(report) => report,
        TriggerResult::Skipped => panic!("trigger was skipped"),
    }
}

fn router_for(engine: &TestEngine) -> Router {
    create_router(ApiState {
        scheduler: engine.scheduler.clone(),
        metrics: engine.metrics.clone(),
    })
}

async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

// ---- Engine over HTTP -------------------------------------------------------

#[tokio::test]
async fn cycle_over_http_notifies_only_the_nearby_open_point() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200).set_body_raw(DIRECTORY_BODY, "application/json"),
    )
    .await;
    let engine = build_engine(&server, ProximityConfig::default(), monday_at(9, 10));

    let report = ran(engine.scheduler.trigger(HERE, TriggerSource::LocationUpdate).await);

    // Record 3 is dropped; 2 is ~7.8 km away; 4 is in range but closed.
    assert_eq!(report.points_fetched, 3);
    assert_eq!(report.points_in_range, 2);
    assert_eq!(report.notifications_sent, 1);

    let sent = engine.sink.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "Riverside Library");
    assert_eq!(sent[0].body, "Open now until 5:00 PM");
    assert_eq!(sent[0].data.poi_id, 1);
    assert_eq!(sent[0].data.action, StatusKind::CurrentlyOpen);

    assert!((engine.metrics.points_dropped_total.get() - 1.0).abs() < f64::EPSILON);
    assert!((engine.metrics.notifications_sent_total.get() - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn repeated_cycle_is_suppressed_by_cooldown() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200).set_body_raw(DIRECTORY_BODY, "application/json"),
    )
    .await;
    let engine = build_engine(&server, ProximityConfig::default(), monday_at(9, 10));

    ran(engine.scheduler.trigger(HERE, TriggerSource::LocationUpdate).await);
    let second = ran(engine.scheduler.trigger(HERE, TriggerSource::Timer).await);

    assert_eq!(second.notifications_sent, 0);
    assert_eq!(second.suppressed, 1);
    assert_eq!(engine.sink.sent().len(), 1);
}

#[tokio::test]
async fn directory_error_aborts_cycle() {
    let server = MockServer::start().await;
    mount_directory(&server, ResponseTemplate::new(500)).await;
    let engine = build_engine(&server, ProximityConfig::default(), monday_at(9, 10));

    let report = ran(engine.scheduler.trigger(HERE, TriggerSource::Timer).await);

    assert!(matches!(report.outcome, CycleOutcome::Aborted(ref reason) if reason.contains("500")));
    assert!(engine.sink.sent().is_empty());
    assert!(!engine.scheduler.is_running());
    assert!((engine.metrics.directory_errors_total.get() - 1.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn non_array_body_aborts_cycle() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200).set_body_raw(r#"{"error": "maintenance"}"#, "application/json"),
    )
    .await;
    let engine = build_engine(&server, ProximityConfig::default(), monday_at(9, 10));

    let report = ran(engine.scheduler.trigger(HERE, TriggerSource::Timer).await);

    assert!(matches!(report.outcome, CycleOutcome::Aborted(_)));
    assert!(!engine.scheduler.is_running());
}

#[tokio::test]
async fn slow_directory_times_out_and_releases_guard() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200)
            .set_body_raw(DIRECTORY_BODY, "application/json")
            .set_delay(StdDuration::from_secs(2)),
    )
    .await;
    let config = ProximityConfig {
        directory_timeout: StdDuration::from_millis(200),
        ..ProximityConfig::default()
    };
    let engine = build_engine(&server, config, monday_at(9, 10));

    let report = ran(engine.scheduler.trigger(HERE, TriggerSource::Timer).await);

    assert_eq!(
        report.outcome,
        CycleOutcome::Aborted("Directory request timed out after 200ms".to_string())
    );
    assert!(engine.sink.sent().is_empty());
    assert!(!engine.scheduler.is_running());
}

#[tokio::test]
async fn overlapping_spawned_triggers_share_one_cycle() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200)
            .set_body_raw(DIRECTORY_BODY, "application/json")
            .set_delay(StdDuration::from_millis(300)),
    )
    .await;
    let engine = build_engine(&server, ProximityConfig::default(), monday_at(9, 10));

    let first = engine.scheduler.spawn_trigger(HERE, TriggerSource::LocationUpdate);
    tokio::time::sleep(StdDuration::from_millis(50)).await;
    let second = engine.scheduler.spawn_trigger(HERE, TriggerSource::Timer);

    let second = second.await.unwrap();
    let first = first.await.unwrap();

    assert!(matches!(second, TriggerResult::Skipped));
    assert!(matches!(first, TriggerResult::Ran(_)));
    assert_eq!(engine.sink.sent().len(), 1);
    assert!((engine.metrics.triggers_skipped_total.get() - 1.0).abs() < f64::EPSILON);
}

// ---- Operational router -----------------------------------------------------

#[tokio::test]
async fn health_returns_ok_and_no_store() {
    let server = MockServer::start().await;
    let engine = build_engine(&server, ProximityConfig::default(), monday_at(9, 10));

    let response = router_for(&engine)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("cache-control").unwrap().to_str().unwrap(),
        "no-store"
    );
}

#[tokio::test]
async fn status_reports_idle_then_last_cycle() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200).set_body_raw(DIRECTORY_BODY, "application/json"),
    )
    .await;
    let engine = build_engine(&server, ProximityConfig::default(), monday_at(9, 10));

    let (status, body) = get_body(router_for(&engine), "/status").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["state"], "idle");
    assert!(json["last_cycle"].is_null());
    assert_eq!(json["poll_interval_ms"], 60_000);

    ran(engine.scheduler.trigger(HERE, TriggerSource::LocationUpdate).await);

    let (_, body) = get_body(router_for(&engine), "/status").await;
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["cooldown_entries"], 1);
    assert_eq!(json["last_cycle"]["notifications_sent"], 1);
    assert_eq!(json["last_cycle"]["outcome"]["status"], "completed");
}

#[tokio::test]
async fn metrics_endpoint_exposes_cycle_counters() {
    let server = MockServer::start().await;
    mount_directory(
        &server,
        ResponseTemplate::new(200).set_body_raw(DIRECTORY_BODY, "application/json"),
    )
    .await;
    let engine = build_engine(&server, ProximityConfig::default(), monday_at(9, 10));
    ran(engine.scheduler.trigger(HERE, TriggerSource::LocationUpdate).await);

    let response = router_for(&engine)
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("content-type").unwrap().to_str().unwrap(),
        "text/plain; version=0.0.4"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("proximity_cycles_total 1"));
    assert!(body.contains("proximity_notifications_sent_total 1"));
    assert!(body.contains("proximity_cooldown_entries 1"));
}
