//! Delivery of synthetic events.
//!
//! The [`EventSink`] trait abstracts where events go, so the synthesizer loop
//! can run against the real ingestion API or an in-memory recorder.

use super::credentials::IngestConfig;
use crate::models::SyntheticEvent;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

/// Header carrying the ingestion API key.
pub const TEAM_HEADER: &str = "X-Honeycomb-Team";

/// Errors that can occur while delivering one event.
#[derive(Debug, Error)]
pub enum SendError {
    /// The endpoint answered with something other than 200.
    #[error("Ingestion endpoint rejected event with status {status}: {body}")]
    Rejected {
        /// Response status.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Destination for synthetic events.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Delivers one event. Exactly one attempt, no retry.
    ///
    /// # Errors
    ///
    /// Returns an error if the event could not be delivered.
    async fn send(&self, event: &SyntheticEvent) -> Result<(), SendError>;
}

/// Posts events to a Honeycomb-style events API.
#[derive(Debug, Clone)]
pub struct HoneycombSink {
    client: reqwest::Client,
    config: IngestConfig,
    url: String,
}

impl HoneycombSink {
    /// Creates a sink for the given ingestion settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: IngestConfig) -> Result<Self, SendError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SendError::Transport(e.to_string()))?;
        let url = config.events_url();
        Ok(Self {
            client,
            config,
            url,
        })
    }

    /// Returns the URL events are posted to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EventSink for HoneycombSink {
    async fn send(&self, event: &SyntheticEvent) -> Result<(), SendError> {
        let response = self
            .client
            .post(&self.url)
            .header(TEAM_HEADER, self.config.api_key())
            .json(event)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(SendError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(any(test, feature = "testing"))]
pub use recording::RecordingSink;

#[cfg(any(test, feature = "testing"))]
mod recording {
    use super::{EventSink, SendError, SyntheticEvent};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// In-memory sink that records every attempt.
    ///
    /// Attempts whose (zero-based) index is in the failure set are recorded
    /// and then answered with a `503` rejection.
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        attempts: Mutex<Vec<SyntheticEvent>>,
        fail_on: HashSet<usize>,
    }

    impl RecordingSink {
        /// Creates a sink that accepts everything.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a sink that rejects the given attempts.
        #[must_use]
        pub fn failing_on(attempts: impl IntoIterator<Item = usize>) -> Self {
            Self {
                attempts: Mutex::new(Vec::new()),
                fail_on: attempts.into_iter().collect(),
            }
        }

        /// Returns every event seen so far, in order.
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned.
        #[must_use]
        pub fn attempts(&self) -> Vec<SyntheticEvent> {
            self.attempts.lock().expect("recording sink lock").clone()
        }
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn send(&self, event: &SyntheticEvent) -> Result<(), SendError> {
            let index = {
                let mut attempts = self
                    .attempts
                    .lock()
                    .map_err(|_| SendError::Transport("recording sink lock".to_string()))?;
                attempts.push(event.clone());
                attempts.len() - 1
            };

            if self.fail_on.contains(&index) {
                return Err(SendError::Rejected {
                    status: 503,
                    body: "scripted failure".to_string(),
                });
            }
            Ok(())
        }
    }
}
