//! Probe implementation: transport, classification policy and retrying client.

/// HTTP transport against the configured registration endpoint
pub mod http;

/// Response classification policies
pub mod policy;

/// Retrying probe client
pub mod client;

use crate::error::ProbeError;
use std::future::Future;

pub use client::ProbeClient;
pub use http::HttpTransport;
pub use policy::{ClassificationPolicy, MarkerPolicy};

/// One probe attempt against the endpoint.
///
/// Implementations return the response body on any response and a
/// transport error (`NetworkError`/`Timeout`) when no body could be read.
pub trait Transport: Send + Sync + 'static {
    fn fetch(&self, email: &str) -> impl Future<Output = Result<String, ProbeError>> + Send;
}
