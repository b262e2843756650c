//! Generator tunables and the configuration error type.

use std::ops::RangeInclusive;
use std::time::Duration;
use thiserror::Error;

/// Errors found while validating synthesizer or ingestion configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// No API key was supplied for the ingestion endpoint.
    #[error("Ingestion API key is not set (export HONEYCOMB_API_KEY=your_api_key)")]
    MissingApiKey,

    /// The dataset name is blank.
    #[error("Dataset name cannot be empty")]
    EmptyDataset,

    /// The ingestion base URL could not be parsed.
    #[error("Invalid ingestion URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The service name is blank.
    #[error("Service name cannot be empty")]
    EmptyServiceName,

    /// The error rate is not a probability.
    #[error("Error rate must be within [0, 1], got {0}")]
    InvalidErrorRate(f64),

    /// No error statuses to inject.
    #[error("Error status list cannot be empty")]
    NoErrorStatuses,

    /// An injected error status is not a 4xx or 5xx code.
    #[error("Injected error status must be within 400..=599, got {0}")]
    InvalidErrorStatus(u16),

    /// A duration range is reversed or not finite.
    #[error("Invalid {name} range {start}..={end}")]
    InvalidRange {
        /// Which range.
        name: &'static str,
        /// Lower bound.
        start: f64,
        /// Upper bound.
        end: f64,
    },
}

/// Tunables of the synthesis model.
///
/// The defaults reproduce the podinfo demo traffic: 5% injected errors,
/// 5-200 ms for ordinary endpoints and 1-5 s for failing requests.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Value of `service.name` on every event.
    pub service_name: String,
    /// Probability of overriding an event with an injected error.
    pub error_rate: f64,
    /// Status codes used for injected errors.
    pub error_statuses: Vec<u16>,
    /// Duration range for injected errors, in milliseconds.
    pub error_duration_ms: RangeInclusive<f64>,
    /// Duration range for endpoints without an embedded delay.
    pub normal_duration_ms: RangeInclusive<f64>,
    /// Jitter added to the embedded delay of `delay` endpoints.
    pub delay_jitter_ms: RangeInclusive<f64>,
    /// Pause between two transmissions.
    pub interval: Duration,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            service_name: "podinfo".to_string(),
            error_rate: 0.05,
            error_statuses: vec![400, 500, 503],
            error_duration_ms: 1000.0..=5000.0,
            normal_duration_ms: 5.0..=200.0,
            delay_jitter_ms: -50.0..=100.0,
            interval: Duration::from_millis(100),
        }
    }
}

impl SynthConfig {
    /// Sets the service name.
    #[must_use]
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = service_name.into();
        self
    }

    /// Sets the error injection probability.
    #[must_use]
    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate;
        self
    }

    /// Sets the pause between transmissions.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Checks that every tunable is usable by the generator.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The service name is empty
    /// - The error rate is outside `[0, 1]`
    /// - The error status list is empty or holds a code outside `400..=599`
    /// - A duration range is reversed or not finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::EmptyServiceName);
        }
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(ConfigError::InvalidErrorRate(self.error_rate));
        }
        if self.error_statuses.is_empty() {
            return Err(ConfigError::NoErrorStatuses);
        }
        if let Some(bad) = self
            .error_statuses
            .iter()
            .find(|s| !(400..=599).contains(*s))
        {
            return Err(ConfigError::InvalidErrorStatus(*bad));
        }
        check_range("error duration", &self.error_duration_ms)?;
        check_range("normal duration", &self.normal_duration_ms)?;
        check_range("delay jitter", &self.delay_jitter_ms)?;
        Ok(())
    }
}

fn check_range(name: &'static str, range: &RangeInclusive<f64>) -> Result<(), ConfigError> {
    let (start, end) = (*range.start(), *range.end());
    if start.is_finite() && end.is_finite() && start <= end {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { name, start, end })
    }
}
