//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

/// Collector endpoint used when `OTEL_EXPORTER_OTLP_ENDPOINT` is unset.
pub const DEFAULT_OTLP_ENDPOINT: &str = "http://otel-collector.flagger-system:4318/v1/traces";

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `PULSEGEN_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `PULSEGEN_PORT`: The port to listen on (default: 8080)
/// - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP/HTTP trace endpoint (default: [`DEFAULT_OTLP_ENDPOINT`])
/// - `OTEL_SERVICE_NAME`: `service.name` on every span (default: "podinfo")
/// - `PULSEGEN_MAX_DELAY_SECS`: Longest delay `/delay/{seconds}` accepts (default: 30)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Where spans are exported.
    pub otlp_endpoint: String,
    /// Service name reported on spans.
    pub service_name: String,
    /// Service version reported as a resource attribute.
    pub service_version: String,
    /// Longest delay the delay endpoint will sleep for.
    pub max_delay: Duration,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `PULSEGEN_PORT` is set but cannot be parsed as a valid port number
    /// - `PULSEGEN_MAX_DELAY_SECS` is set but is not a non-negative number
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("PULSEGEN_HOST").unwrap_or(defaults.host);

        let port = std::env::var("PULSEGEN_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("PULSEGEN_PORT must be a port number")?
            .unwrap_or(defaults.port);

        let otlp_endpoint =
            std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or(defaults.otlp_endpoint);

        let service_name = std::env::var("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name);

        let max_delay = std::env::var("PULSEGEN_MAX_DELAY_SECS")
            .ok()
            .map(|s| {
                s.parse::<f64>()
                    .ok()
                    .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                    .with_context(|| format!("PULSEGEN_MAX_DELAY_SECS is not a valid delay: {s}"))
            })
            .transpose()?
            .unwrap_or(defaults.max_delay);

        Ok(Self {
            host,
            port,
            otlp_endpoint,
            service_name,
            service_version: defaults.service_version,
            max_delay,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            otlp_endpoint: DEFAULT_OTLP_ENDPOINT.to_string(),
            service_name: "podinfo".to_string(),
            service_version: "1.0.0".to_string(),
            max_delay: Duration::from_secs(30),
        }
    }
}
