//! Integration tests for OTLP/HTTP span export.
//!
//! Tests cover:
//! - Spans recorded by handlers reaching a collector as OTLP JSON
//! - Resource attributes on exported spans
//! - Collector failures not affecting request handling

use std::sync::{Arc, Mutex};
use std::time::Duration;

use api::telemetry::{self, BatchSettings};
use api::{create_router, AppState, WorkProfile};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use opentelemetry_sdk::trace::SdkTracerProvider;
use serde_json::Value;

use super::common::get;

type Received = Arc<Mutex<Vec<Value>>>;

/// Starts a fake collector answering every export with `status`.
async fn spawn_collector(status: StatusCode) -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route(
            "/v1/traces",
            post(move |State(received): State<Received>, body: Bytes| async move {
                let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
                received.lock().unwrap().push(body);
                (status, "{}")
            }),
        )
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1/traces"), received)
}

async fn app_with_collector(endpoint: &str) -> (Router, SdkTracerProvider) {
    let resource = telemetry::resource("podinfo", "1.0.0");
    let provider = telemetry::otlp_provider(endpoint, resource, BatchSettings::default())
        .await
        .unwrap();
    let state = AppState::new(
        telemetry::tracer(&provider),
        WorkProfile::instant(),
        Duration::from_secs(30),
    );
    (create_router(state), provider)
}

fn string_attr<'a>(attrs: &'a Value, key: &str) -> Option<&'a str> {
    attrs
        .as_array()?
        .iter()
        .find(|kv| kv["key"] == key)
        .and_then(|kv| kv["value"]["stringValue"].as_str())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spans_reach_collector() {
    let (endpoint, received) = spawn_collector(StatusCode::OK).await;
    let (router, provider) = app_with_collector(&endpoint).await;

    get(router.clone(), "/healthz").await;
    get(router, "/error/503").await;
    telemetry::shutdown(provider).await.unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);

    let resource_spans = &received[0]["resourceSpans"][0];
    let resource_attrs = &resource_spans["resource"]["attributes"];
    assert_eq!(string_attr(resource_attrs, "service.name"), Some("podinfo"));
    assert_eq!(string_attr(resource_attrs, "service.version"), Some("1.0.0"));

    let scope_spans = &resource_spans["scopeSpans"][0];
    assert_eq!(scope_spans["scope"]["name"], telemetry::SCOPE_NAME);

    let spans = scope_spans["spans"].as_array().unwrap();
    assert_eq!(spans.len(), 2);
    assert_eq!(spans[0]["name"], "health_check");
    assert_eq!(spans[0]["kind"], 2);
    assert_eq!(spans[0]["traceId"].as_str().unwrap().len(), 32);
    assert_eq!(spans[1]["name"], "error_endpoint");
    assert_eq!(spans[1]["status"]["code"], 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_collector_failure_does_not_break_requests() {
    let (endpoint, received) = spawn_collector(StatusCode::SERVICE_UNAVAILABLE).await;
    let (router, provider) = app_with_collector(&endpoint).await;

    let (status, _) = get(router.clone(), "/version").await;
    assert_eq!(status, StatusCode::OK);
    // The export result is the collector's 503; requests are unaffected.
    let _ = telemetry::force_flush(&provider).await;

    let (status, _) = get(router, "/version").await;
    assert_eq!(status, StatusCode::OK);
    let _ = telemetry::shutdown(provider).await;

    // Each batch was attempted once and dropped; nothing was retried.
    assert_eq!(received.lock().unwrap().len(), 2);
}
