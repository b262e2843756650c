//! Endpoint catalog sampled by the traffic synthesizer.
//!
//! Every synthetic event is built from one [`EndpointSpec`]: the request
//! target, its method and the status codes a healthy response may carry.

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// A request target the synthesizer may report on.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSpec {
    /// Request target, e.g. `/api/info`.
    pub target: String,
    /// HTTP method.
    pub method: String,
    /// Status codes the endpoint normally answers with.
    pub statuses: Vec<u16>,
}

impl EndpointSpec {
    /// Creates a new endpoint entry.
    #[must_use]
    pub fn new(target: impl Into<String>, method: impl Into<String>, statuses: &[u16]) -> Self {
        Self {
            target: target.into(),
            method: method.into(),
            statuses: statuses.to_vec(),
        }
    }

    /// Returns the embedded delay in seconds for `delay` targets.
    ///
    /// The delay is the last path segment, so `/delay/0.5` yields `Some(0.5)`.
    /// Targets without `delay` in them, or whose last segment is not a
    /// non-negative number, yield `None`.
    #[must_use]
    pub fn delay_seconds(&self) -> Option<f64> {
        if !self.target.contains("delay") {
            return None;
        }
        self.target
            .rsplit('/')
            .next()
            .and_then(|segment| segment.parse::<f64>().ok())
            .filter(|seconds| seconds.is_finite() && *seconds >= 0.0)
    }

    /// Picks one of the endpoint's status candidates.
    pub fn pick_status<R: Rng + ?Sized>(&self, rng: &mut R) -> u16 {
        // Catalog::new guarantees at least one candidate.
        self.statuses.choose(rng).copied().unwrap_or(200)
    }
}

/// Errors raised when building a catalog.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    /// The catalog has no entries.
    #[error("Endpoint catalog cannot be empty")]
    Empty,

    /// An entry has no status candidates.
    #[error("Endpoint {method} {target} has no status candidates")]
    NoStatuses {
        /// The offending target.
        target: String,
        /// The offending method.
        method: String,
    },
}

/// A fixed, non-empty set of endpoints.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<EndpointSpec>,
}

impl Catalog {
    /// Creates a catalog from the given entries.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no entries or an entry has no status
    /// candidates.
    pub fn new(entries: Vec<EndpointSpec>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(bad) = entries.iter().find(|e| e.statuses.is_empty()) {
            return Err(CatalogError::NoStatuses {
                target: bad.target.clone(),
                method: bad.method.clone(),
            });
        }
        Ok(Self { entries })
    }

    /// Returns all entries.
    #[must_use]
    pub fn entries(&self) -> &[EndpointSpec] {
        &self.entries
    }

    /// Picks an entry uniformly at random.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &EndpointSpec {
        &self.entries[rng.gen_range(0..self.entries.len())]
    }

    /// Returns true if `target`/`method`/`status` is one of the catalog's triples.
    #[must_use]
    pub fn contains(&self, target: &str, method: &str, status: u16) -> bool {
        self.entries
            .iter()
            .any(|e| e.target == target && e.method == method && e.statuses.contains(&status))
    }

    /// Returns true if `target`/`method` names a catalog entry.
    #[must_use]
    pub fn contains_endpoint(&self, target: &str, method: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.target == target && e.method == method)
    }
}

impl Default for Catalog {
    /// The podinfo endpoints the demo server exposes, plus two API routes.
    fn default() -> Self {
        Self {
            entries: vec![
                EndpointSpec::new("/version", "GET", &[200]),
                EndpointSpec::new("/healthz", "GET", &[200]),
                EndpointSpec::new("/delay/0.1", "GET", &[200]),
                EndpointSpec::new("/delay/0.5", "GET", &[200]),
                EndpointSpec::new("/api/info", "GET", &[200, 404]),
                EndpointSpec::new("/api/echo", "POST", &[200, 400]),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::default();
        assert_eq!(catalog.entries().len(), 6);
        assert!(catalog.contains("/api/echo", "POST", 400));
        assert!(!catalog.contains("/api/echo", "GET", 200));
        assert!(!catalog.contains("/version", "GET", 500));
    }

    #[test]
    fn test_delay_seconds() {
        assert_eq!(
            EndpointSpec::new("/delay/0.5", "GET", &[200]).delay_seconds(),
            Some(0.5)
        );
        assert_eq!(
            EndpointSpec::new("/delay/2", "GET", &[200]).delay_seconds(),
            Some(2.0)
        );
        assert_eq!(
            EndpointSpec::new("/version", "GET", &[200]).delay_seconds(),
            None
        );
        assert_eq!(
            EndpointSpec::new("/delay/slow", "GET", &[200]).delay_seconds(),
            None
        );
        assert_eq!(
            EndpointSpec::new("/delay/-1", "GET", &[200]).delay_seconds(),
            None
        );
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(Catalog::new(Vec::new()).unwrap_err(), CatalogError::Empty);
    }

    #[test]
    fn test_new_rejects_entry_without_statuses() {
        let err = Catalog::new(vec![EndpointSpec::new("/x", "GET", &[])]).unwrap_err();
        assert!(matches!(err, CatalogError::NoStatuses { .. }));
    }

    #[test]
    fn test_pick_covers_every_entry() {
        let catalog = Catalog::default();
        let mut rng = StdRng::seed_from_u64(11);

        let seen: HashSet<String> = (0..2_000)
            .map(|_| catalog.pick(&mut rng).target.clone())
            .collect();

        assert_eq!(seen.len(), catalog.entries().len());
    }

    #[test]
    fn test_pick_status_stays_in_candidates() {
        let spec = EndpointSpec::new("/api/info", "GET", &[200, 404]);
        let mut rng = StdRng::seed_from_u64(5);

        for _ in 0..500 {
            assert!(spec.statuses.contains(&spec.pick_status(&mut rng)));
        }
    }
}
