//! Error handling for probe operations.
//!
//! This module defines the error type shared by every stage of the pipeline,
//! from list loading and configuration to the network probe itself.

use std::fmt;
use std::time::Duration;

/// Main error type for mail-probe operations.
///
/// Transport variants (`NetworkError`, `Timeout`) are recovered inside the
/// probe client and never reach the caller of a batch run. The remaining
/// variants surface from list loading, configuration and sink I/O.
#[derive(Debug, Clone)]
pub enum ProbeError {
    /// Network-related errors (connection refused, DNS, broken body, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// A single probe attempt exceeded its time budget
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// File I/O errors for the input list and the output channels
    FileError {
        path: String,
        message: String,
    },

    /// Configuration errors (invalid settings, missing endpoint, etc.)
    ConfigError {
        message: String,
    },
}

impl ProbeError {
    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Whether this error is a transport-level failure that the probe
    /// client should retry.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Timeout { .. })
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::Timeout { operation, duration } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl std::error::Error for ProbeError {}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // Duration unknown here; HttpTransport attaches the configured one.
            Self::timeout("HTTP request", Duration::ZERO)
        } else if err.is_builder() {
            // The request could not be built from the configured endpoint,
            // so no attempt reached the network.
            Self::config(format!("Invalid probe request: {}", err))
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<toml::de::Error> for ProbeError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
