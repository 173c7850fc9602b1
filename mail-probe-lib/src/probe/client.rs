//! Retrying probe client.
//!
//! Wraps a [`Transport`] and a [`ClassificationPolicy`]. Transport failures
//! are retried immediately up to the attempt ceiling; any response that
//! yields a body is classified and never retried.

use crate::error::ProbeError;
use crate::probe::{ClassificationPolicy, HttpTransport, MarkerPolicy, Transport};
use crate::types::{Outcome, ProbeConfig, ProbeResult, DEFAULT_MAX_ATTEMPTS};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Classifies one email per call.
pub struct ProbeClient<T: Transport = HttpTransport> {
    transport: T,
    policy: Arc<dyn ClassificationPolicy>,
    max_attempts: u32,
}

impl ProbeClient<HttpTransport> {
    /// Build an HTTP probe client with the marker policy from `config`.
    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let transport = HttpTransport::from_config(config)?;
        Ok(Self::new(
            transport,
            Arc::new(MarkerPolicy::new(config.marker.clone())),
            config.max_attempts,
        ))
    }
}

impl<T: Transport> ProbeClient<T> {
    /// Create a client from its parts. `max_attempts` is raised to at least 1.
    pub fn new(transport: T, policy: Arc<dyn ClassificationPolicy>, max_attempts: u32) -> Self {
        Self {
            transport,
            policy,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Create a client with the default marker policy and retry ceiling.
    pub fn with_transport(transport: T) -> Self {
        Self::new(transport, Arc::new(MarkerPolicy::default()), DEFAULT_MAX_ATTEMPTS)
    }

    /// Swap the classification policy.
    pub fn with_policy(mut self, policy: Arc<dyn ClassificationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Probe one syntactically valid email.
    ///
    /// Never fails: transport errors degrade to `Outcome::Failed` once the
    /// attempt ceiling is reached. Non-transport errors from a custom
    /// transport are treated the same way, without retry.
    pub async fn check(&self, email: &str) -> ProbeResult {
        let start_time = Instant::now();
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_attempts {
            attempts += 1;
            debug!(email, attempt = attempts, "probe attempt");

            match self.transport.fetch(email).await {
                Ok(body) => {
                    return ProbeResult {
                        email: email.to_string(),
                        outcome: self.policy.classify(&body),
                        attempts,
                        check_duration: start_time.elapsed(),
                        error_message: None,
                    };
                }
                Err(e) => {
                    debug!(email, attempt = attempts, error = %e, "probe attempt failed");
                    let retryable = e.is_transport();
                    last_error = Some(e);
                    if !retryable {
                        break;
                    }
                }
            }
        }

        warn!(email, attempts, "probe gave up");

        ProbeResult {
            email: email.to_string(),
            outcome: Outcome::Failed,
            attempts,
            check_duration: start_time.elapsed(),
            error_message: last_error.map(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    /// Transport that replays a fixed behaviour and counts calls.
    pub(crate) struct FakeTransport {
        pub(crate) calls: Arc<AtomicU32>,
        /// Number of leading calls that fail with a timeout
        pub(crate) failures: u32,
        pub(crate) body: String,
    }

    impl FakeTransport {
        pub(crate) fn answering(body: &str) -> Self {
            Self {
                calls: Arc::new(AtomicU32::new(0)),
                failures: 0,
                body: body.to_string(),
            }
        }

        pub(crate) fn failing_first(failures: u32, body: &str) -> Self {
            Self {
                failures,
                ..Self::answering(body)
            }
        }
    }

    impl Transport for FakeTransport {
        async fn fetch(&self, _email: &str) -> Result<String, ProbeError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(ProbeError::timeout("probe request", Duration::from_secs(10)))
            } else {
                Ok(self.body.clone())
            }
        }
    }

    #[tokio::test]
    async fn test_marker_body_is_invalid_in_one_attempt() {
        let transport = FakeTransport::answering("Create account");
        let calls = transport.calls.clone();
        let client = ProbeClient::with_transport(transport);

        let result = client.check("new@example.com").await;
        assert_eq!(result.outcome, Outcome::Invalid);
        assert_eq!(result.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_body_is_valid_in_one_attempt() {
        let transport = FakeTransport::answering("Enter your password");
        let calls = transport.calls.clone();
        let client = ProbeClient::with_transport(transport);

        let result = client.check("known@example.com").await;
        assert_eq!(result.outcome, Outcome::Valid);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn test_always_failing_transport_stops_at_ceiling() {
        let transport = FakeTransport::failing_first(u32::MAX, "");
        let calls = transport.calls.clone();
        let client = ProbeClient::with_transport(transport);

        let result = client.check("slow@example.com").await;
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(result.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(result.error_message.unwrap().contains("Timeout"));
    }

    #[tokio::test]
    async fn test_one_failure_then_success_is_classified() {
        let transport = FakeTransport::failing_first(1, "Create account");
        let calls = transport.calls.clone();
        let client = ProbeClient::with_transport(transport);

        let result = client.check("flaky@example.com").await;
        assert_eq!(result.outcome, Outcome::Invalid);
        assert_eq!(result.attempts, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_custom_ceiling() {
        let transport = FakeTransport::failing_first(u32::MAX, "");
        let calls = transport.calls.clone();
        let client = ProbeClient::new(transport, Arc::new(MarkerPolicy::default()), 5);

        let result = client.check("slow@example.com").await;
        assert_eq!(result.outcome, Outcome::Failed);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_custom_policy() {
        let client = ProbeClient::with_transport(FakeTransport::answering("status=free"))
            .with_policy(Arc::new(|body: &str| {
                if body.contains("free") {
                    Outcome::Invalid
                } else {
                    Outcome::Valid
                }
            }));

        assert_eq!(client.check("x@example.com").await.outcome, Outcome::Invalid);
    }
}
