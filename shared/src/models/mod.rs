//! Data models for Pulsegen.
//!
//! This module contains the synthetic event record sent by the traffic
//! synthesizer.

pub mod event;

pub use event::{correlation_id, EventValidationError, SyntheticEvent};
