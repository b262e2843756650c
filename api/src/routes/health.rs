//! Version and health check endpoints.

use crate::state::{AppState, WorkProfile};
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Application version reported by `/version`.
pub const APP_VERSION: &str = "6.0.0";

/// Commit reported by `/version`.
pub const APP_COMMIT: &str = "abc123";

/// Version response.
#[derive(Debug, Serialize, Deserialize)]
pub struct VersionResponse {
    /// Application version.
    pub version: String,
    /// Source commit.
    pub commit: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "OK" if reachable.
    pub status: String,
}

/// Creates the version and health check routes.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    let mut span = state.server_span("get_version", "GET", "/version".to_string());
    WorkProfile::simulate(&state.work().version_ms).await;
    span.set_status_code(200);
    state.record(span);

    Json(VersionResponse {
        version: APP_VERSION.to_string(),
        commit: APP_COMMIT.to_string(),
    })
}

/// Health check handler.
///
/// Intended for load balancers and Kubernetes probes.
async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let mut span = state.server_span("health_check", "GET", "/healthz".to_string());
    WorkProfile::simulate(&state.work().health_ms).await;
    span.set_status_code(200);
    state.record(span);

    Json(HealthResponse {
        status: "OK".to_string(),
    })
}
