//! Reporting middleware tests
//!
//! Drives a small router through `tower::ServiceExt::oneshot` and inspects
//! the payloads the reporter hands to its transport.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Router,
};
use bugsnag_axum::{report_errors, ApiError, ReportState, ReportUser, Reported};
use bugsnag_core::{BreadcrumbTrail, BreadcrumbType, BugsnagConfig, OpaqueError, Result};
use bugsnag_notifier::{ConnectionManager, Reporter, Transport};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Forwards every submitted payload to the test
struct ChannelTransport {
    tx: mpsc::UnboundedSender<Value>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn post(&self, _url: &str, _headers: Vec<(String, String)>, body: Vec<u8>) -> Result<u16> {
        let _ = self.tx.send(serde_json::from_slice(&body)?);
        Ok(200)
    }
}

async fn fail_bad_request(body: String) -> std::result::Result<String, ApiError> {
    if body.contains("secret") {
        Err(ApiError::bad_request("order rejected"))
    } else {
        Ok(body)
    }
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

async fn missing() -> std::result::Result<&'static str, ApiError> {
    Err(ApiError::not_found("order 7"))
}

async fn crash(Extension(trail): Extension<BreadcrumbTrail>) -> std::result::Result<&'static str, Reported<OpaqueError>> {
    trail.leave("Loaded cart", BreadcrumbType::State);
    trail.leave("Calling inventory", BreadcrumbType::Process);
    Err(anyhow::anyhow!("inventory offline").into())
}

async fn crash_as_user() -> Response {
    let mut response = ApiError::internal("ledger out of balance").into_response();
    response.extensions_mut().insert(ReportUser("user-42".to_string()));
    response
}

fn app() -> (Router, mpsc::UnboundedReceiver<Value>) {
    app_with_body_limit(bugsnag_axum::DEFAULT_MAX_BODY_BYTES)
}

fn app_with_body_limit(limit: usize) -> (Router, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let config = BugsnagConfig::new("test-api-key")
        .with_endpoint("https://notify.example.test")
        .with_key_filters(["password"]);
    let reporter = Reporter::with_connection(
        &config,
        ConnectionManager::with_transport(&config, Arc::new(ChannelTransport { tx })),
    );

    let router = Router::new()
        .route("/orders", post(fail_bad_request))
        .route("/unavailable", get(unavailable))
        .route("/missing", get(missing))
        .route("/crash", get(crash))
        .route("/ledger", get(crash_as_user))
        .route("/health", get(|| async { "ok" }))
        .layer(from_fn_with_state(
            ReportState::new(reporter).with_max_body_bytes(limit),
            report_errors,
        ));
    (router, rx)
}

async fn next_report(rx: &mut mpsc::UnboundedReceiver<Value>) -> Value {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("no report submitted")
        .expect("transport dropped")
}

/// A closed channel also means nothing was sent: in-flight submissions keep
/// the sender alive until they finish.
async fn assert_no_report(rx: &mut mpsc::UnboundedReceiver<Value>) {
    let received = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
    assert!(!matches!(received, Ok(Some(_))), "unexpected report: {received:?}");
}

#[tokio::test]
async fn test_api_error_is_reported_with_request_details() {
    let (app, mut rx) = app();
    let request = Request::post("/orders?source=web")
        .header("host", "shop.example")
        .header("x-forwarded-for", "203.0.113.9")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"item":"secret-sauce","password":"hunter2"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let rendered: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(rendered["error_type"], "bad_request");

    let payload = next_report(&mut rx).await;
    assert_eq!(payload["apiKey"], "test-api-key");
    let event = &payload["events"][0];
    assert_eq!(event["severity"], "warning");
    assert_eq!(event["exceptions"][0]["type"], "Bad Request");
    assert_eq!(event["exceptions"][0]["message"], "order rejected");
    assert_eq!(event["metaData"]["Error type"], "bad_request");
    assert_eq!(event["metaData"]["Response status"], "400");

    let request = &event["request"];
    assert_eq!(request["httpMethod"], "POST");
    assert_eq!(request["url"], "http://shop.example/orders?source=web");
    assert_eq!(request["clientIp"], "203.0.113.9");
    assert_eq!(request["headers"]["content-type"], "application/json");

    let captured: Value = serde_json::from_str(request["body"].as_str().unwrap()).unwrap();
    assert_eq!(captured["item"], "secret-sauce");
    assert!(captured.get("password").is_none());
}

#[tokio::test]
async fn test_handler_still_receives_the_body() {
    let (app, mut rx) = app();
    let request = Request::post("/orders").body(Body::from("plain order")).unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"plain order");
    assert_no_report(&mut rx).await;
}

#[tokio::test]
async fn test_server_error_without_attached_error_is_reported() {
    let (app, mut rx) = app();
    let response = app
        .oneshot(Request::get("/unavailable").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let event = &next_report(&mut rx).await["events"][0];
    assert_eq!(event["severity"], "error");
    assert_eq!(event["exceptions"][0]["type"], "Service Unavailable");
    assert_eq!(event["exceptions"][0]["message"], bugsnag_core::FALLBACK_MESSAGE);
    assert_eq!(event["request"]["body"], "");
}

#[tokio::test]
async fn test_success_and_suppressed_errors_are_not_reported() {
    let (app, mut rx) = app();

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_no_report(&mut rx).await;
}

#[tokio::test]
async fn test_breadcrumbs_from_handler_are_included() {
    let (app, mut rx) = app();
    let response = app
        .oneshot(Request::get("/crash").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let event = &next_report(&mut rx).await["events"][0];
    let names: Vec<&str> = event["breadcrumbs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|crumb| crumb["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["GET /crash", "Loaded cart", "Calling inventory"]);
    assert_eq!(event["breadcrumbs"][0]["type"], "request");
    assert_eq!(event["metaData"]["Error localized description"], "inventory offline");
}

#[tokio::test]
async fn test_user_from_response_extension() {
    let (app, mut rx) = app();
    let response = app
        .oneshot(Request::get("/ledger").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let event = &next_report(&mut rx).await["events"][0];
    assert_eq!(event["user"]["id"], "user-42");
    assert_eq!(event["exceptions"][0]["message"], "ledger out of balance");
}

#[tokio::test]
async fn test_oversized_body_streams_through_uncaptured() {
    let (app, mut rx) = app_with_body_limit(8);
    let request = Request::post("/orders")
        .body(Body::from("this order carries a secret"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let event = &next_report(&mut rx).await["events"][0];
    assert_eq!(event["exceptions"][0]["message"], "order rejected");
    assert!(event["request"].get("body").is_none());
}
