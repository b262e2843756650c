//! Integration tests for the demo endpoints.
//!
//! Tests cover:
//! - Response bodies and status codes of every endpoint
//! - One span per request, including rejected requests
//! - Span attributes and status

use axum::http::StatusCode;
use opentelemetry::trace::{SpanId, SpanKind, Status};
use opentelemetry::Value;

use super::common::{attr, get, test_app};

#[tokio::test]
async fn test_version() {
    let app = test_app();

    let (status, response) = get(app.router, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["version"], "6.0.0");
    assert_eq!(response["commit"], "abc123");
}

#[tokio::test]
async fn test_healthz() {
    let app = test_app();

    let (status, response) = get(app.router, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "OK");
}

#[tokio::test]
async fn test_delay() {
    let app = test_app();

    let (status, response) = get(app.router, "/delay/0.1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["delay"], 0.1);
}

#[tokio::test]
async fn test_error_codes_pass_through() {
    let app = test_app();

    for code in [400_u16, 404, 500, 503] {
        let (status, response) = get(app.router.clone(), &format!("/error/{code}")).await;
        assert_eq!(status.as_u16(), code);
        assert_eq!(response["error"], format!("HTTP {code}"));
    }
}

#[tokio::test]
async fn test_load() {
    let app = test_app();

    let (status, response) = get(app.router, "/load").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["message"], "Load test completed");
    assert!(response["work_duration_ms"].is_number());
}

#[tokio::test]
async fn test_every_request_emits_one_span() {
    let app = test_app();

    let uris = [
        "/version",
        "/healthz",
        "/delay/0",
        "/error/418",
        "/load",
        "/delay/not-a-number",
    ];
    for uri in uris {
        get(app.router.clone(), uri).await;
    }

    let spans = app.spans();
    assert_eq!(spans.len(), uris.len());

    let names: Vec<&str> = spans.iter().map(|s| s.name.as_ref()).collect();
    assert_eq!(
        names,
        vec![
            "get_version",
            "health_check",
            "delay_endpoint",
            "error_endpoint",
            "load_test",
            "delay_endpoint",
        ]
    );

    for span in &spans {
        assert_eq!(span.span_kind, SpanKind::Server);
        assert_eq!(span.parent_span_id, SpanId::INVALID);
        assert!(span.end_time >= span.start_time);
        assert_eq!(attr(span, "http.method"), Some(Value::from("GET")));
        assert!(attr(span, "http.status_code").is_some());
    }

    // Each request starts its own trace.
    let mut trace_ids: Vec<String> = spans
        .iter()
        .map(|s| s.span_context.trace_id().to_string())
        .collect();
    trace_ids.sort_unstable();
    trace_ids.dedup();
    assert_eq!(trace_ids.len(), spans.len());
}

#[tokio::test]
async fn test_error_span_is_marked() {
    let app = test_app();

    get(app.router.clone(), "/error/500").await;

    let spans = app.spans();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].status, Status::error("HTTP 500"));
    assert_eq!(attr(&spans[0], "error"), Some(Value::Bool(true)));
    assert_eq!(attr(&spans[0], "http.target"), Some(Value::from("/error/500")));
}

#[tokio::test]
async fn test_rejections_have_error_body() {
    let app = test_app();

    let (status, response) = get(app.router.clone(), "/delay/-0.5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_delay");
    assert!(response["message"].is_string());

    let (status, response) = get(app.router.clone(), "/error/1000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["error"], "invalid_status");

    let spans = app.spans();
    assert_eq!(spans.len(), 2);
    assert!(spans
        .iter()
        .all(|s| attr(s, "http.status_code") == Some(Value::I64(400))));
}
