//! Pulsegen Shared Library
//!
//! This crate contains the event model, endpoint catalog and traffic
//! synthesizer behind the `pulsegen` CLI.
//!
//! # Modules
//!
//! - [`models`] - The synthetic request-outcome event
//! - [`catalog`] - The fixed endpoint catalog the synthesizer samples from
//! - [`synth`] - Event generation, delivery and configuration validation
//!
//! # Example
//!
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use shared::catalog::Catalog;
//! use shared::synth::{SynthConfig, TrafficGenerator};
//!
//! let mut generator = TrafficGenerator::with_rng(
//!     Catalog::default(),
//!     SynthConfig::default(),
//!     StdRng::seed_from_u64(7),
//! )
//! .expect("default config is valid");
//!
//! let event = generator.next_event();
//! assert_eq!(event.is_error(), event.status_code >= 400);
//! assert!(event.validate_event().is_ok());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod models;
pub mod synth;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use rand;
pub use serde;
pub use serde_json;
