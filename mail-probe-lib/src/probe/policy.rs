//! Classification policies.
//!
//! A policy turns a response body into `Valid` or `Invalid`. The default
//! [`MarkerPolicy`] looks for a literal marker; a body without the marker is
//! taken as "already registered", which also covers any unexpected response
//! shape. That fallback is kept as is.

use crate::types::{Outcome, DEFAULT_MARKER};

/// Maps a probe response body to an outcome.
///
/// Implementations must only return `Outcome::Valid` or `Outcome::Invalid`.
pub trait ClassificationPolicy: Send + Sync {
    fn classify(&self, body: &str) -> Outcome;
}

impl<F> ClassificationPolicy for F
where
    F: Fn(&str) -> Outcome + Send + Sync,
{
    fn classify(&self, body: &str) -> Outcome {
        self(body)
    }
}

/// Marker text present → `Invalid` (signup prompt shown), otherwise `Valid`.
#[derive(Debug, Clone)]
pub struct MarkerPolicy {
    marker: String,
}

impl MarkerPolicy {
    pub fn new<S: Into<String>>(marker: S) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for MarkerPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}

impl ClassificationPolicy for MarkerPolicy {
    fn classify(&self, body: &str) -> Outcome {
        if body.contains(&self.marker) {
            Outcome::Invalid
        } else {
            Outcome::Valid
        }
    }
}
