//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.

use opentelemetry::trace::{Span as _, SpanKind, Status, Tracer as _};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::trace::{SdkTracer, Span};
use rand::Rng;
use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

/// How long each endpoint pretends to work, in milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkProfile {
    /// `/version`.
    pub version_ms: RangeInclusive<u64>,
    /// `/healthz`.
    pub health_ms: RangeInclusive<u64>,
    /// `/error/{code}`.
    pub error_ms: RangeInclusive<u64>,
    /// `/load`.
    pub load_ms: RangeInclusive<u64>,
    /// Whether `/delay/{seconds}` actually sleeps.
    pub honor_delay: bool,
}

impl Default for WorkProfile {
    fn default() -> Self {
        Self {
            version_ms: 10..=50,
            health_ms: 5..=20,
            error_ms: 100..=500,
            load_ms: 100..=1000,
            honor_delay: true,
        }
    }
}

impl WorkProfile {
    /// A profile that never sleeps.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            version_ms: 0..=0,
            health_ms: 0..=0,
            error_ms: 0..=0,
            load_ms: 0..=0,
            honor_delay: false,
        }
    }

    /// Picks a duration from `range` and sleeps for it, returning what was slept.
    pub async fn simulate(range: &RangeInclusive<u64>) -> Duration {
        let millis = if range.start() >= range.end() {
            *range.start()
        } else {
            rand::thread_rng().gen_range(range.clone())
        };
        let work = Duration::from_millis(millis);
        if !work.is_zero() {
            tokio::time::sleep(work).await;
        }
        work
    }
}

/// The one server span a request produces.
#[derive(Debug)]
pub struct RequestSpan {
    name: &'static str,
    span: Span,
}

impl RequestSpan {
    /// Sets an attribute on the span.
    pub fn set_attribute(&mut self, key: &'static str, value: impl Into<Value>) {
        self.span.set_attribute(KeyValue::new(key, value));
    }

    /// Records the response status code.
    pub fn set_status_code(&mut self, code: u16) {
        self.set_attribute("http.status_code", i64::from(code));
    }

    /// Marks the span as failed.
    pub fn fail(&mut self, description: impl Into<String>) {
        self.set_attribute("error", true);
        self.span.set_status(Status::error(description.into()));
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    tracer: SdkTracer,
    work: Arc<WorkProfile>,
    max_delay: Duration,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(tracer: SdkTracer, work: WorkProfile, max_delay: Duration) -> Self {
        Self {
            tracer,
            work: Arc::new(work),
            max_delay,
        }
    }

    /// Returns the simulated work profile.
    #[must_use]
    pub fn work(&self) -> &WorkProfile {
        &self.work
    }

    /// Returns the longest delay the delay endpoint accepts.
    #[must_use]
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Starts a server span for a request.
    ///
    /// Every request is its own trace; no incoming context is propagated.
    #[must_use]
    pub fn server_span(
        &self,
        name: &'static str,
        method: &'static str,
        target: String,
    ) -> RequestSpan {
        let span = self
            .tracer
            .span_builder(name)
            .with_kind(SpanKind::Server)
            .with_attributes([
                KeyValue::new("http.method", method),
                KeyValue::new("http.target", target),
            ])
            .start(&self.tracer);
        RequestSpan { name, span }
    }

    /// Ends a span, handing it to the span processor.
    pub fn record(&self, request: RequestSpan) {
        let RequestSpan { name, mut span } = request;
        tracing::debug!(
            span = name,
            trace_id = %span.span_context().trace_id(),
            "Recorded span"
        );
        span.end();
    }
}
