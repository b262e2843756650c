//! Span export pipeline.
//!
//! Spans are produced with the OpenTelemetry SDK tracer and shipped by its
//! batch span processor to an OTLP/HTTP collector using the JSON encoding.
//! Export failures are logged by the SDK and the batch is dropped.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::{ExporterBuildError, Protocol, WithExportConfig};
use opentelemetry_sdk::error::OTelSdkError;
use opentelemetry_sdk::trace::{
    BatchConfigBuilder, BatchSpanProcessor, SdkTracer, SdkTracerProvider,
};
use opentelemetry_sdk::Resource;
use std::time::Duration;
use thiserror::Error;

/// Instrumentation scope name attached to every span.
pub const SCOPE_NAME: &str = "pulsegen";

/// Bound on one export request.
pub const EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from setting up or tearing down span export.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The OTLP exporter could not be built.
    #[error("Failed to build OTLP exporter: {0}")]
    Build(#[from] ExporterBuildError),

    /// The tracer provider failed to flush or shut down.
    #[error("Tracer provider error: {0}")]
    Sdk(#[from] OTelSdkError),

    /// The blocking task running the SDK call panicked or was cancelled.
    #[error("Telemetry task failed: {0}")]
    Task(String),
}

/// Batching parameters for the span processor.
#[derive(Debug, Clone, Copy)]
pub struct BatchSettings {
    /// Spans buffered before new ones are dropped.
    pub max_queue_size: usize,
    /// A batch is exported as soon as it reaches this many spans.
    pub max_batch_size: usize,
    /// A partial batch is exported after this long.
    pub scheduled_delay: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            max_queue_size: 2048,
            max_batch_size: 512,
            scheduled_delay: Duration::from_secs(5),
        }
    }
}

/// Builds the resource every exported span is attached to.
#[must_use]
pub fn resource(service_name: &str, service_version: &str) -> Resource {
    Resource::builder()
        .with_service_name(service_name.to_string())
        .with_attribute(KeyValue::new("service.version", service_version.to_string()))
        .build()
}

/// Creates a tracer provider that batches spans to an OTLP/HTTP collector.
///
/// `endpoint` is the full trace URL, including `/v1/traces`. The exporter
/// runs on the SDK's own background thread with a blocking HTTP client, so
/// it is built off the async runtime.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built.
pub async fn otlp_provider(
    endpoint: &str,
    resource: Resource,
    settings: BatchSettings,
) -> Result<SdkTracerProvider, TelemetryError> {
    let endpoint = endpoint.to_string();
    tokio::task::spawn_blocking(move || -> Result<SdkTracerProvider, TelemetryError> {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpJson)
            .with_endpoint(endpoint)
            .with_timeout(EXPORT_TIMEOUT)
            .build()?;

        let config = BatchConfigBuilder::default()
            .with_max_queue_size(settings.max_queue_size)
            .with_max_export_batch_size(settings.max_batch_size)
            .with_scheduled_delay(settings.scheduled_delay)
            .build();
        let processor = BatchSpanProcessor::builder(exporter)
            .with_batch_config(config)
            .build();

        Ok(SdkTracerProvider::builder()
            .with_span_processor(processor)
            .with_resource(resource)
            .build())
    })
    .await
    .map_err(|e| TelemetryError::Task(e.to_string()))?
}

/// Returns the tracer handlers start their spans from.
#[must_use]
pub fn tracer(provider: &SdkTracerProvider) -> SdkTracer {
    provider.tracer(SCOPE_NAME)
}

/// Exports every span ended so far and waits for the export to finish.
///
/// # Errors
///
/// Returns an error if the export fails or the provider is shut down.
pub async fn force_flush(provider: &SdkTracerProvider) -> Result<(), TelemetryError> {
    let provider = provider.clone();
    tokio::task::spawn_blocking(move || provider.force_flush())
        .await
        .map_err(|e| TelemetryError::Task(e.to_string()))??;
    Ok(())
}

/// Flushes pending spans and stops the export thread.
///
/// # Errors
///
/// Returns an error if the final export fails or the provider was already
/// shut down.
pub async fn shutdown(provider: SdkTracerProvider) -> Result<(), TelemetryError> {
    tokio::task::spawn_blocking(move || provider.shutdown())
        .await
        .map_err(|e| TelemetryError::Task(e.to_string()))??;
    tracing::debug!("Span export stopped");
    Ok(())
}
