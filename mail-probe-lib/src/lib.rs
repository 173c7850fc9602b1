//! # Mail Probe Library
//!
//! Concurrent classification of email addresses against a registration
//! endpoint.
//!
//! Each address goes through a format check, one HTTP probe with bounded
//! retry, and a result sink with three per-outcome files plus a shared log.
//! A batch coordinator fans a list out to a fixed-size worker pool and
//! aggregates the outcomes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mail_probe_lib::{BatchCoordinator, ProbeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ProbeConfig::default()
//!         .with_endpoint("https://id.example.test/register")
//!         .with_param("mode", "signup");
//!
//!     let coordinator = BatchCoordinator::from_config(&config).await?;
//!     coordinator.sink().reset().await?;
//!
//!     let emails = vec!["someone@example.com".to_string()];
//!     let summary = coordinator
//!         .run(&emails, |result, progress| {
//!             println!("{} ({}%)", result.outcome.status_line(&result.email), progress.percent);
//!         })
//!         .await;
//!
//!     println!("valid: {}", summary.counters.valid);
//!     Ok(())
//! }
//! ```
//!
//! ## Outcomes
//!
//! - **valid**: the endpoint skipped its signup prompt (address registered)
//! - **invalid**: the endpoint showed its signup prompt
//! - **failed**: every attempt failed at the transport level
//! - **skipped**: malformed address, never sent

// Re-export main public API types and functions
pub use config::{
    env_config_from, load_env_config, validate_endpoint, ConfigManager, EnvConfig, FileConfig,
    ProbeSection, RunSection,
};
pub use coordinator::BatchCoordinator;
pub use error::ProbeError;
pub use probe::{
    ClassificationPolicy, HttpTransport, MarkerPolicy, ProbeClient, Transport,
};
pub use sink::ResultSink;
pub use types::{
    Outcome, OutputPaths, ProbeConfig, ProbeResult, Progress, RunCounters, RunSummary,
    DEFAULT_MARKER, DEFAULT_MAX_ATTEMPTS, DEFAULT_POOL_SIZE, DEFAULT_TIMEOUT,
};
pub use utils::{is_valid_email, load_email_list, parse_email_list};

// Internal modules - these are not part of the public API
mod config;
mod coordinator;
mod error;
mod probe;
mod sink;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ProbeError>;

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
