//! API route definitions.
//!
//! Every handler records exactly one server span per invocation, including
//! invocations that are rejected.

mod health;
mod workload;

pub use health::health_routes;
pub use workload::workload_routes;

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable description.
    pub message: String,
}

/// A rejection a handler can return directly.
pub type Rejection = (StatusCode, Json<ApiError>);

fn bad_request(error: &str, message: String) -> Rejection {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError {
            error: error.to_string(),
            message,
        }),
    )
}
