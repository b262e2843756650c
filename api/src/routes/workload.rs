//! Endpoints that simulate slow, failing and expensive requests.

use super::{bad_request, Rejection};
use crate::state::{AppState, RequestSpan, WorkProfile};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Response for `/delay/{seconds}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DelayResponse {
    /// The delay that was applied, in seconds.
    pub delay: f64,
}

/// Response for `/error/{code}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEndpointResponse {
    /// `HTTP <code>`.
    pub error: String,
}

/// Response for `/load`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoadResponse {
    /// Fixed completion message.
    pub message: String,
    /// How long the simulated work took.
    pub work_duration_ms: f64,
}

/// Creates the delay, error and load routes.
pub fn workload_routes(state: AppState) -> Router {
    Router::new()
        .route("/delay/{seconds}", get(delay))
        .route("/error/{code}", get(error_endpoint))
        .route("/load", get(load_test))
        .with_state(state)
}

/// Records a rejected request on its span and builds the rejection.
fn reject(state: &AppState, mut span: RequestSpan, error: &str, message: String) -> Rejection {
    span.set_status_code(StatusCode::BAD_REQUEST.as_u16());
    span.fail(message.clone());
    state.record(span);
    bad_request(error, message)
}

async fn delay(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<DelayResponse>, Rejection> {
    let mut span = state.server_span("delay_endpoint", "GET", format!("/delay/{raw}"));

    let Some(seconds) = raw
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
    else {
        return Err(reject(
            &state,
            span,
            "invalid_delay",
            format!("Delay must be a non-negative number of seconds, got '{raw}'"),
        ));
    };

    let max_delay = state.max_delay();
    if seconds > max_delay.as_secs_f64() {
        return Err(reject(
            &state,
            span,
            "invalid_delay",
            format!(
                "Delay {seconds}s exceeds the maximum of {}s",
                max_delay.as_secs_f64()
            ),
        ));
    }

    span.set_attribute("delay.seconds", seconds);
    if state.work().honor_delay {
        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
    }
    span.set_status_code(200);
    state.record(span);

    Ok(Json(DelayResponse { delay: seconds }))
}

async fn error_endpoint(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Json<ErrorEndpointResponse>), Rejection> {
    let mut span = state.server_span("error_endpoint", "GET", format!("/error/{raw}"));

    let Some(status) = raw
        .parse::<u16>()
        .ok()
        .filter(|code| (200..=599).contains(code))
        .and_then(|code| StatusCode::from_u16(code).ok())
    else {
        return Err(reject(
            &state,
            span,
            "invalid_status",
            format!("Status code must be within 200..=599, got '{raw}'"),
        ));
    };

    let error = format!("HTTP {}", status.as_u16());
    span.set_status_code(status.as_u16());
    span.fail(error.clone());
    WorkProfile::simulate(&state.work().error_ms).await;
    state.record(span);

    Ok((status, Json(ErrorEndpointResponse { error })))
}

async fn load_test(State(state): State<AppState>) -> Json<LoadResponse> {
    let mut span = state.server_span("load_test", "GET", "/load".to_string());
    span.set_status_code(200);

    let work = WorkProfile::simulate(&state.work().load_ms).await;
    let work_duration_ms = work.as_secs_f64() * 1000.0;
    span.set_attribute("work.duration_ms", work_duration_ms);
    state.record(span);

    Json(LoadResponse {
        message: "Load test completed".to_string(),
        work_duration_ms,
    })
}
