//! End-to-end tests of the HTTP API, driving the router in-process.

#![cfg(feature = "http-server")]

use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use store_monitor::http::{create_router, AppState};
use store_monitor::services::{ReportError, ReportJobRegistry, ReportSource};

mod support;

struct FailingSource;

impl ReportSource for FailingSource {
    fn generate_csv(&self) -> Result<String, ReportError> {
        Err(ReportError::Aborted("disk on fire".to_string()))
    }
}

/// Blocks until the test sends on the paired channel.
struct GatedSource(Mutex<Receiver<()>>);

impl ReportSource for GatedSource {
    fn generate_csv(&self) -> Result<String, ReportError> {
        let _ = self.0.lock().unwrap().recv();
        Ok("gated\r\n".to_string())
    }
}

fn app() -> Router {
    create_router(AppState::new(support::sample_builder(), 2))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Trigger a report and poll `/get_report` until it is no longer running.
async fn run_report(app: &Router) -> (String, StatusCode, serde_json::Value) {
    let (status, body) = send_json(app, post("/trigger_report")).await;
    assert_eq!(status, StatusCode::OK);
    let report_id = body["report_id"].as_str().unwrap().to_string();
    poll_until_done(app, &report_id).await
}

async fn poll_until_done(
    app: &Router,
    report_id: &str,
) -> (String, StatusCode, serde_json::Value) {
    for _ in 0..500 {
        let (status, body) =
            send_json(app, get(&format!("/get_report?report_id={}", report_id))).await;
        if body["status"] != "Running" {
            return (report_id.to_string(), status, body);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("report {} never finished", report_id);
}

#[tokio::test]
async fn test_home() {
    let (status, body) = send(&app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Store Monitoring System");
}

#[tokio::test]
async fn test_health_reports_table_sizes() {
    let (status, body) = send_json(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stores"], 2);
    assert_eq!(body["observations"], 6);
}

#[tokio::test]
async fn test_report_data_returns_rows() {
    let (status, body) = send_json(&app(), get("/report_data")).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["store_id"], "S1");
    assert_eq!(rows[0]["uptime_last_day_hours"], 0.5);
    assert_eq!(rows[1]["store_id"], "S2");
    assert_eq!(rows[1]["downtime_last_hour_minutes"], 45.0);
}

#[tokio::test]
async fn test_get_report_requires_id() {
    let (status, body) = send_json(&app(), get("/get_report")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_get_report_unknown_id_is_not_found() {
    let (status, body) = send_json(&app(), get("/get_report?report_id=nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_running_report_cannot_be_downloaded() {
    let (release, gate) = mpsc::channel();
    let jobs = ReportJobRegistry::new(Arc::new(GatedSource(Mutex::new(gate))), 1);
    let app = create_router(AppState::with_registry(support::sample_builder(), jobs));

    let (_, body) = send_json(&app, post("/trigger_report")).await;
    let report_id = body["report_id"].as_str().unwrap().to_string();

    let (status, body) =
        send_json(&app, get(&format!("/get_report?report_id={}", report_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"status": "Running"}));

    let (status, body) = send_json(&app, get(&format!("/reports/{}/csv", report_id))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    release.send(()).unwrap();
    let (_, status, body) = poll_until_done(&app, &report_id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["csv"], "gated\r\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_report_job_completes_with_csv() {
    let app = app();
    let (report_id, status, body) = run_report(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Complete");

    let csv = body["csv"].as_str().unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "store_id,uptime_last_hour_minutes,uptime_last_day_hours,uptime_last_week_hours,\
         downtime_last_hour_minutes,downtime_last_day_hours,downtime_last_week_hours"
    );
    assert_eq!(lines.count(), 2);

    let response = app
        .clone()
        .oneshot(get(&format!("/reports/{}/csv", report_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(std::str::from_utf8(&bytes).unwrap(), csv);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_job_returns_500_with_error() {
    let jobs = ReportJobRegistry::new(Arc::new(FailingSource), 1);
    let app = create_router(AppState::with_registry(support::sample_builder(), jobs));

    let (report_id, status, body) = run_report(&app).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "Error");
    assert!(body["error"].as_str().unwrap().contains("disk on fire"));

    let (status, body) = send_json(&app, get(&format!("/reports/{}/csv", report_id))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "REPORT_FAILED");
    assert_eq!(body["details"], format!("report_id={}", report_id));
    assert!(body["message"].as_str().unwrap().contains("disk on fire"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_events_stream_ends_with_complete() {
    let app = app();
    let (report_id, _, _) = run_report(&app).await;

    let (status, body) = send(&app, get(&format!("/reports/{}/events", report_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("event: status"));
    assert!(body.contains("event: complete"));
    assert!(body.contains("\"Complete\""));
}

#[tokio::test]
async fn test_events_unknown_id_is_not_found() {
    let (status, _) = send(&app(), get("/reports/missing/events")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
