//! Random sampling of synthetic events.

use super::config::{ConfigError, SynthConfig};
use crate::catalog::Catalog;
use crate::models::SyntheticEvent;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// One generated event and whether the error-injection path produced it.
#[derive(Debug, Clone)]
pub struct Sample {
    /// The generated event.
    pub event: SyntheticEvent,
    /// True when the status and duration were overridden by error injection.
    pub injected_error: bool,
}

/// Produces synthetic events from a catalog and a random source.
///
/// Successive events are independent; the generator keeps no history.
#[derive(Debug)]
pub struct TrafficGenerator<R = StdRng> {
    catalog: Catalog,
    config: SynthConfig,
    rng: R,
}

impl TrafficGenerator<StdRng> {
    /// Creates a generator seeded from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(catalog: Catalog, config: SynthConfig) -> Result<Self, ConfigError> {
        Self::with_rng(catalog, config, StdRng::from_entropy())
    }

    /// Creates a generator that replays the same sequence for the same seed.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn seeded(catalog: Catalog, config: SynthConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(catalog, config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> TrafficGenerator<R> {
    /// Creates a generator over an arbitrary random source.
    ///
    /// The config is validated here so sampling never sees a reversed or
    /// non-finite range.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn with_rng(catalog: Catalog, config: SynthConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            catalog,
            config,
            rng,
        })
    }

    /// Returns the catalog events are drawn from.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Returns the generator's tunables.
    #[must_use]
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Generates the next event.
    pub fn next_event(&mut self) -> SyntheticEvent {
        self.next_sample().event
    }

    /// Generates the next event along with how it was produced.
    pub fn next_sample(&mut self) -> Sample {
        let rng = &mut self.rng;
        let endpoint = self.catalog.pick(rng);
        let mut status_code = endpoint.pick_status(rng);

        let mut duration_ms = match endpoint.delay_seconds() {
            Some(seconds) => seconds * 1000.0 + uniform(rng, &self.config.delay_jitter_ms),
            None => uniform(rng, &self.config.normal_duration_ms),
        };

        let injected_error = rng.gen::<f64>() < self.config.error_rate;
        if injected_error {
            status_code = self
                .config
                .error_statuses
                .choose(rng)
                .copied()
                .unwrap_or(500);
            duration_ms = uniform(rng, &self.config.error_duration_ms);
        }

        let event = SyntheticEvent::new(
            self.config.service_name.as_str(),
            endpoint.method.as_str(),
            endpoint.target.as_str(),
            status_code,
            duration_ms,
        )
        .with_random_ids(rng);

        Sample {
            event,
            injected_error,
        }
    }
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, range: &RangeInclusive<f64>) -> f64 {
    if range.start() >= range.end() {
        return *range.start();
    }
    rng.gen_range(range.clone())
}
