//! Traffic synthesizer.
//!
//! Builds synthetic request-outcome events and delivers them one at a time to
//! an [`EventSink`]. The loop is strictly sequential: generate, send, pause,
//! repeat. A failed send is logged and the loop moves on.
//!
//! # Example
//!
//! ```no_run
//! use shared::catalog::Catalog;
//! use shared::synth::{HoneycombSink, IngestConfig, Synthesizer, SynthConfig, TrafficGenerator};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let ingest = IngestConfig::new(
//!     std::env::var("HONEYCOMB_API_KEY").ok(),
//!     "podinfo-service",
//!     "https://api.honeycomb.io/1/events",
//! )?;
//! let generator = TrafficGenerator::new(Catalog::default(), SynthConfig::default())?;
//! let mut synthesizer = Synthesizer::new(generator, HoneycombSink::new(ingest)?);
//!
//! synthesizer.generate_and_send(100).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod generator;
pub mod sink;

pub use config::{ConfigError, SynthConfig};
pub use credentials::{IngestConfig, DEFAULT_BASE_URL, DEFAULT_DATASET};
pub use generator::{Sample, TrafficGenerator};
#[cfg(any(test, feature = "testing"))]
pub use sink::RecordingSink;
pub use sink::{EventSink, HoneycombSink, SendError};

use rand::Rng;

/// Drives a generator into a sink.
#[derive(Debug)]
pub struct Synthesizer<S, R = rand::rngs::StdRng> {
    generator: TrafficGenerator<R>,
    sink: S,
}

impl<S: EventSink, R: Rng> Synthesizer<S, R> {
    /// Creates a synthesizer.
    pub fn new(generator: TrafficGenerator<R>, sink: S) -> Self {
        Self { generator, sink }
    }

    /// Returns the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the synthesizer, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Generates `count` events and makes exactly one delivery attempt for each.
    ///
    /// Delivery failures are logged and skipped; nothing is retried and no
    /// error is returned. The configured interval is slept between events.
    pub async fn generate_and_send(&mut self, count: usize) {
        let interval = self.generator.config().interval;

        for i in 0..count {
            let event = self.generator.next_event();

            match self.sink.send(&event).await {
                Ok(()) => tracing::info!(
                    method = %event.method,
                    target = %event.endpoint,
                    status = event.status_code,
                    duration_ms = event.duration_ms,
                    "Sent event"
                ),
                Err(e) => tracing::warn!(
                    method = %event.method,
                    target = %event.endpoint,
                    status = event.status_code,
                    error = %e,
                    "Failed to send event"
                ),
            }

            if i + 1 < count && !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
        }

        tracing::info!(count, "Data generation complete");
    }
}
