//! HTTP 接口测试

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::{build_service, build_service_with_store, ScriptedDetector};
use serde_json::Value;
use std::sync::Arc;
use ticket_drop_monitor::server::router;
use ticket_drop_monitor::Outcome;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
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

#[tokio::test]
async fn test_check_tickets_defaults_to_unavailable() {
    // Given: 尚未检测
    let service = Arc::new(build_service(Arc::new(ScriptedDetector::new(&[])), vec![]));

    // When
    let response = router(service).oneshot(get("/check-tickets")).await.unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({ "available": false }));
}

#[tokio::test]
async fn test_check_now_then_query() {
    // Given
    let detector = Arc::new(ScriptedDetector::new(&[Outcome::Available]));
    let service = Arc::new(build_service(detector, vec![]));
    let app = router(Arc::clone(&service));

    // When: 手动检测
    let response = app.clone().oneshot(post("/check-now")).await.unwrap();

    // Then
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["available"], true);
    assert_eq!(body["outcome"], "available");
    assert_eq!(body["consecutiveFailures"], 0);

    let response = app.oneshot(get("/check-tickets")).await.unwrap();
    assert_eq!(body_json(response).await["available"], true);
}

#[tokio::test]
async fn test_status_reports_failures() {
    let detector = Arc::new(ScriptedDetector::new(&[Outcome::FetchFailed]));
    let service = Arc::new(build_service(detector, vec![]));
    service.check_now().await.unwrap();

    let response = router(service).oneshot(get("/status")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["lastConfirmed"], "unavailable");
    assert_eq!(body["consecutiveFailures"], 1);
    assert_eq!(body["lastOutcome"], "fetch_failed");
    assert!(body["lastCheckedAt"].is_string());
}

#[tokio::test]
async fn test_check_now_after_stop_is_unavailable() {
    // Given: 监控已停止
    let service = Arc::new(build_service(Arc::new(ScriptedDetector::new(&[])), vec![]));
    service.start().unwrap();
    service.stop().await;

    // When
    let response = router(Arc::clone(&service)).oneshot(post("/check-now")).await.unwrap();

    // Then: 503，查询接口仍可用
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let response = router(service).oneshot(get("/check-tickets")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_check_tickets_reflects_background_check() {
    // Given: 前台服务和后台检测共用一个状态文件
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let watch = Arc::new(build_service_with_store(
        Arc::new(ScriptedDetector::new(&[Outcome::Unavailable])),
        &path,
    ));
    watch.check_now().await.unwrap();

    // When: 后台检测发现有票
    let background = build_service_with_store(Arc::new(ScriptedDetector::new(&[Outcome::Available])), &path);
    background.check_now().await.unwrap();

    // Then: 前台接口立即报告有票
    let response = router(watch).oneshot(get("/check-tickets")).await.unwrap();
    assert_eq!(body_json(response).await, serde_json::json!({ "available": true }));
}
