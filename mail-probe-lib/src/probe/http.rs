//! HTTP transport for probe requests.
//!
//! Sends one GET per attempt to the configured endpoint. The query string
//! carries the fixed parameters followed by the email parameter, and the
//! client signature goes out as the User-Agent header.

use crate::config::validate_endpoint;
use crate::error::ProbeError;
use crate::probe::Transport;
use crate::types::ProbeConfig;
use std::time::Duration;
use tracing::debug;

/// reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpTransport {
    /// HTTP client carrying the timeout and User-Agent
    http_client: reqwest::Client,
    /// Endpoint URL
    endpoint: reqwest::Url,
    /// Fixed query parameters, sent before the email
    params: Vec<(String, String)>,
    /// Name of the email query parameter
    email_param: String,
    /// Per-attempt timeout, kept for error reporting
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport from a probe configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::ConfigError` if the endpoint is missing or not
    /// an http(s) URL, or if the HTTP client cannot be built from the
    /// configured settings (e.g. a User-Agent that is not a valid header).
    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        if config.endpoint.trim().is_empty() {
            return Err(ProbeError::config("No probe endpoint configured"));
        }
        let endpoint = validate_endpoint(&config.endpoint)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ProbeError::config(format!("Failed to create probe HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            endpoint,
            params: config.params.clone(),
            email_param: config.email_param.clone(),
            timeout: config.timeout,
        })
    }

    /// Query pairs for one email, fixed parameters first.
    fn query<'a>(&'a self, email: &'a str) -> Vec<(&'a str, &'a str)> {
        let mut query: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        query.push((self.email_param.as_str(), email));
        query
    }

    fn map_error(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::timeout("probe request", self.timeout)
        } else {
            ProbeError::from(err)
        }
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, email: &str) -> Result<String, ProbeError> {
        let response = self
            .http_client
            .get(self.endpoint.clone())
            .query(&self.query(email))
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        debug!(email, status = %response.status(), "probe response");

        response.text().await.map_err(|e| self.map_error(e))
    }
}
