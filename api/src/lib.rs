//! Pulsegen Demo Server
//!
//! A small instrumented HTTP service for exercising an observability
//! pipeline. Every request produces exactly one server span, which the
//! OpenTelemetry SDK batches and exports to a collector over OTLP/HTTP.
//!
//! # Endpoints
//!
//! - `GET /version` - Application version
//! - `GET /healthz` - Health check
//! - `GET /delay/{seconds}` - Responds after the given delay
//! - `GET /error/{code}` - Responds with the given status code
//! - `GET /load` - Simulates an expensive request
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod routes;
mod state;
pub mod telemetry;

pub use config::{Config, DEFAULT_OTLP_ENDPOINT};
pub use routes::ApiError;
pub use state::{AppState, RequestSpan, WorkProfile};

use anyhow::{Context, Result};
use axum::Router;
use telemetry::BatchSettings;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the demo server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the demo server with the provided configuration.
///
/// Spans still queued when the server stops are exported before returning.
///
/// # Errors
///
/// Returns an error if:
/// - The OTLP span exporter cannot be created
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        otlp_endpoint = %config.otlp_endpoint,
        service = %config.service_name,
        "Pulsegen demo server starting"
    );

    let resource = telemetry::resource(&config.service_name, &config.service_version);
    let provider =
        telemetry::otlp_provider(&config.otlp_endpoint, resource, BatchSettings::default())
            .await
            .context("Failed to create OTLP exporter")?;

    let state = AppState::new(
        telemetry::tracer(&provider),
        WorkProfile::default(),
        config.max_delay,
    );
    let app = create_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = telemetry::shutdown(provider).await {
        tracing::warn!(error = %e, "Span export did not shut down cleanly");
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::workload_routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::in_memory;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_healthz_endpoint_returns_200() {
        let (state, _exporter) = in_memory(WorkProfile::instant());
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_healthz_endpoint_returns_json() {
        let (state, _exporter) = in_memory(WorkProfile::instant());
        let app = create_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok());

        assert!(content_type.is_some_and(|ct| ct.contains("application/json")));
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (state, _exporter) = in_memory(WorkProfile::instant());
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_config_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.otlp_endpoint, DEFAULT_OTLP_ENDPOINT);
        assert_eq!(config.service_name, "podinfo");
        assert_eq!(config.service_version, "1.0.0");
    }

    #[test]
    fn test_config_socket_addr() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            ..Config::default()
        };
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn test_config_invalid_socket_addr() {
        let config = Config {
            host: "not a host".to_string(),
            ..Config::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
