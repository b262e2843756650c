//! Synthetic request-outcome events.
//!
//! A [`SyntheticEvent`] is what an instrumented service would have reported
//! for one HTTP request. The synthesizer builds one right before sending it
//! to the ingestion endpoint and drops it afterwards.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Serialize, Serializer};
use thiserror::Error;
use validator::Validate;

/// Span kind reported for every synthetic event.
pub const SERVER_SPAN_KIND: &str = "server";

/// Lowest status code that counts as an error.
pub const ERROR_STATUS_THRESHOLD: u16 = 400;

/// One simulated request outcome.
///
/// # Example
///
/// ```
/// use shared::models::SyntheticEvent;
///
/// let event = SyntheticEvent::new("podinfo", "GET", "/healthz", 503, 1200.5)
///     .with_ids("trace-123456", "span-654321");
///
/// assert!(event.is_error());
/// let json = serde_json::to_value(&event).unwrap();
/// assert_eq!(json["http.status_code"], 503);
/// assert_eq!(json["error"], true);
/// ```
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct SyntheticEvent {
    /// When the event was generated.
    pub timestamp: DateTime<Utc>,

    /// The service the request was made against.
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,

    /// HTTP method.
    #[validate(length(min = 1, message = "HTTP method cannot be empty"))]
    pub method: String,

    /// Request target, e.g. `/delay/0.5`.
    #[validate(length(min = 1, message = "Endpoint cannot be empty"))]
    pub endpoint: String,

    /// HTTP status code of the simulated response.
    #[validate(range(min = 100, max = 599, message = "Status code must be within 100..=599"))]
    pub status_code: u16,

    /// Simulated request duration in milliseconds.
    pub duration_ms: f64,

    /// Correlation id of the simulated trace.
    #[validate(length(min = 1, message = "Trace ID cannot be empty"))]
    pub trace_id: String,

    /// Correlation id of the simulated span.
    #[validate(length(min = 1, message = "Span ID cannot be empty"))]
    pub span_id: String,
}

/// Errors that can occur during event validation.
#[derive(Debug, Error)]
pub enum EventValidationError {
    /// The duration is negative, NaN or infinite.
    #[error("Duration must be a finite, non-negative number of milliseconds")]
    InvalidDuration,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl SyntheticEvent {
    /// Creates a new event stamped with the current time.
    ///
    /// Trace and span ids start out empty; use [`with_ids`](Self::with_ids)
    /// or [`with_random_ids`](Self::with_random_ids) to fill them in.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        method: impl Into<String>,
        endpoint: impl Into<String>,
        status_code: u16,
        duration_ms: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            service_name: service_name.into(),
            method: method.into(),
            endpoint: endpoint.into(),
            status_code,
            duration_ms,
            trace_id: String::new(),
            span_id: String::new(),
        }
    }

    /// Sets the trace and span ids.
    #[must_use]
    pub fn with_ids(mut self, trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self.span_id = span_id.into();
        self
    }

    /// Fills in `trace-NNNNNN` / `span-NNNNNN` ids drawn from `rng`.
    #[must_use]
    pub fn with_random_ids<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let trace_id = correlation_id("trace", rng);
        let span_id = correlation_id("span", rng);
        self.with_ids(trace_id, span_id)
    }

    /// Returns true when the status code is 400 or above.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status_code >= ERROR_STATUS_THRESHOLD
    }

    /// Validates the event.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The duration is negative or not finite
    /// - Any string field is empty
    /// - The status code is outside `100..=599`
    pub fn validate_event(&self) -> Result<(), EventValidationError> {
        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return Err(EventValidationError::InvalidDuration);
        }
        self.validate()?;
        Ok(())
    }
}

/// Builds a `<prefix>-NNNNNN` id with a six digit random suffix.
///
/// Unique enough for a demo; collisions are possible.
pub fn correlation_id<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    format!("{prefix}-{}", rng.gen_range(100_000..=999_999))
}

/// The JSON body accepted by the ingestion endpoint.
#[derive(Serialize)]
struct WireEvent<'a> {
    timestamp: String,
    #[serde(rename = "service.name")]
    service_name: &'a str,
    #[serde(rename = "http.method")]
    method: &'a str,
    #[serde(rename = "http.target")]
    endpoint: &'a str,
    #[serde(rename = "http.status_code")]
    status_code: u16,
    duration_ms: f64,
    #[serde(rename = "span.kind")]
    span_kind: &'static str,
    #[serde(rename = "trace.trace_id")]
    trace_id: &'a str,
    #[serde(rename = "trace.span_id")]
    span_id: &'a str,
    error: bool,
}

impl Serialize for SyntheticEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireEvent {
            timestamp: self.timestamp.to_rfc3339(),
            service_name: &self.service_name,
            method: &self.method,
            endpoint: &self.endpoint,
            status_code: self.status_code,
            duration_ms: self.duration_ms,
            span_kind: SERVER_SPAN_KIND,
            trace_id: &self.trace_id,
            span_id: &self.span_id,
            error: self.is_error(),
        }
        .serialize(serializer)
    }
}
