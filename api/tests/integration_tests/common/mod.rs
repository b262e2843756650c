//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup, span lookups and HTTP request helpers.

use std::time::Duration;

use api::{create_router, telemetry, AppState, WorkProfile};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use opentelemetry::Value;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use serde_json::Value as Json;

/// A router whose spans land in memory as soon as they end.
pub struct TestApp {
    pub router: Router,
    pub exporter: InMemorySpanExporter,
}

impl TestApp {
    /// Returns every span finished so far.
    pub fn spans(&self) -> Vec<SpanData> {
        self.exporter.get_finished_spans().unwrap()
    }
}

/// Creates a test app whose handlers never sleep.
pub fn test_app() -> TestApp {
    let exporter = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .with_resource(telemetry::resource("podinfo", "1.0.0"))
        .build();
    let state = AppState::new(
        telemetry::tracer(&provider),
        WorkProfile::instant(),
        Duration::from_secs(30),
    );

    TestApp {
        router: create_router(state),
        exporter,
    }
}

/// Looks up an attribute on a finished span.
pub fn attr(span: &SpanData, key: &str) -> Option<Value> {
    span.attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.clone())
}

/// Helper to make a GET request.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `uri` - The URI path to GET
///
/// # Returns
///
/// A tuple of the response status code and the JSON response body
/// (`Json::Null` if the body is not JSON).
pub async fn get(app: Router, uri: &str) -> (StatusCode, Json) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Json = serde_json::from_slice(&body_bytes).unwrap_or(Json::Null);

    (status, json)
}
