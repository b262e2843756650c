//! Ingestion endpoint settings, validated once at startup.

use super::config::ConfigError;
use reqwest::Url;
use std::time::Duration;

/// Default Honeycomb events API.
pub const DEFAULT_BASE_URL: &str = "https://api.honeycomb.io/1/events";

/// Default dataset the podinfo demo traffic lands in.
pub const DEFAULT_DATASET: &str = "podinfo-service";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MASK_PREFIX_LEN: usize = 8;
const MASK_MIN_LEN: usize = 2 * MASK_PREFIX_LEN;

/// Where and how synthetic events are delivered.
#[derive(Clone)]
pub struct IngestConfig {
    api_key: String,
    /// Dataset name appended to the base URL.
    pub dataset: String,
    /// Base URL of the events API.
    pub base_url: Url,
    /// Timeout for one transmission.
    pub timeout: Duration,
}

impl std::fmt::Debug for IngestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestConfig")
            .field("api_key", &self.masked_api_key())
            .field("dataset", &self.dataset)
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl IngestConfig {
    /// Validates the ingestion settings.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `api_key` is missing or blank
    /// - `dataset` is blank
    /// - `base_url` is not an absolute http(s) URL
    pub fn new(
        api_key: Option<String>,
        dataset: impl Into<String>,
        base_url: &str,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let dataset = dataset.into().trim().to_string();
        if dataset.is_empty() {
            return Err(ConfigError::EmptyDataset);
        }

        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: base_url.to_string(),
                reason: "scheme must be http or https".to_string(),
            });
        }

        Ok(Self {
            api_key,
            dataset,
            base_url,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the API key sent in the team header.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns a loggable form of the API key.
    ///
    /// Keys of at least 16 characters show their first 8. Shorter keys are
    /// replaced by their length, so at least half of any key stays hidden.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        let len = self.api_key.chars().count();
        if len < MASK_MIN_LEN {
            return format!("<{len} chars>");
        }
        let prefix: String = self.api_key.chars().take(MASK_PREFIX_LEN).collect();
        format!("{prefix}...")
    }

    /// Returns `{base_url}/{dataset}`.
    #[must_use]
    pub fn events_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.dataset
        )
    }
}
