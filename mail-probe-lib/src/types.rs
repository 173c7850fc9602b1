//! Core data types for the probe pipeline.
//!
//! This module defines outcomes, per-record results, run counters,
//! progress snapshots and the runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default number of records processed concurrently.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// Default per-attempt timeout for a probe request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default retry ceiling (total attempts, not extra retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Default marker text signalling a fresh signup prompt.
pub const DEFAULT_MARKER: &str = "Create account";

/// Default name of the query parameter carrying the email.
pub const DEFAULT_EMAIL_PARAM: &str = "email";

/// Terminal classification of one email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The endpoint skipped the signup prompt: address already registered
    Valid,

    /// The endpoint showed the signup prompt: address not registered
    Invalid,

    /// Every probe attempt failed at the transport level
    Failed,

    /// Malformed address, never sent to the network
    Skipped,
}

impl Outcome {
    /// Console/log line for an email with this outcome.
    pub fn status_line(&self, email: &str) -> String {
        match self {
            Outcome::Valid => format!("[+] {} - Valid", email),
            Outcome::Invalid => format!("[-] {} - Invalid", email),
            Outcome::Failed => format!("[?] {} - Check failed", email),
            Outcome::Skipped => format!("[!] Skipping invalid email format: {}", email),
        }
    }
}

/// What one worker reports back to the aggregator.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// The email as it appeared in the list (trimmed)
    pub email: String,

    /// Terminal classification
    pub outcome: Outcome,

    /// Number of probe attempts made (0 for skipped records)
    pub attempts: u32,

    /// How long the pipeline took for this record
    pub check_duration: Duration,

    /// Last transport error, only set when `outcome` is `Failed`
    pub error_message: Option<String>,
}

impl ProbeResult {
    /// Result for a record that failed format validation.
    pub fn skipped(email: &str) -> Self {
        Self {
            email: email.to_string(),
            outcome: Outcome::Skipped,
            attempts: 0,
            check_duration: Duration::ZERO,
            error_message: None,
        }
    }
}

/// Count of records per outcome for one batch run.
///
/// Owned by the aggregating flow only; workers never touch it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub valid: usize,
    pub invalid: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunCounters {
    /// Record one more outcome.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Valid => self.valid += 1,
            Outcome::Invalid => self.invalid += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }

    /// Number of records completed so far.
    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.failed + self.skipped
    }
}

/// Snapshot handed to the progress observer after each completed record.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `completed * 100 / total`, integer division
    pub percent: usize,
    pub counters: RunCounters,
}

impl Progress {
    pub(crate) fn new(counters: RunCounters, total: usize) -> Self {
        let completed = counters.total();
        let percent = if total == 0 { 100 } else { completed * 100 / total };
        Self {
            completed,
            total,
            percent,
            counters,
        }
    }
}

/// Final report of a batch run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub counters: RunCounters,
    pub total: usize,
    pub duration: Duration,
    pub paths: OutputPaths,
}

/// Locations of the four output channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub valid: PathBuf,
    pub invalid: PathBuf,
    pub retry: PathBuf,
    pub log: PathBuf,
}

impl OutputPaths {
    /// Fixed file names inside `dir`.
    pub fn in_dir<P: Into<PathBuf>>(dir: P) -> Self {
        let dir = dir.into();
        Self {
            valid: dir.join("valid_emails.txt"),
            invalid: dir.join("invalid_emails.txt"),
            retry: dir.join("retry_emails.txt"),
            log: dir.join("checker.log"),
        }
    }

    /// The per-outcome file for an outcome, if it has one.
    pub fn for_outcome(&self, outcome: Outcome) -> Option<&PathBuf> {
        match outcome {
            Outcome::Valid => Some(&self.valid),
            Outcome::Invalid => Some(&self.invalid),
            Outcome::Failed => Some(&self.retry),
            Outcome::Skipped => None,
        }
    }

    /// All four paths, per-outcome files first.
    pub fn all(&self) -> [&PathBuf; 4] {
        [&self.valid, &self.invalid, &self.retry, &self.log]
    }
}

/// Runtime configuration for a batch run.
///
/// Built from defaults, config files and environment variables by
/// [`crate::ConfigManager`]. The endpoint has no default; a run without one
/// fails validation.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Registration endpoint probed for every email
    pub endpoint: String,

    /// Fixed query parameters sent with every probe
    pub params: Vec<(String, String)>,

    /// Name of the query parameter carrying the email
    /// Default: "email"
    pub email_param: String,

    /// Body substring that signals a fresh signup prompt
    /// Default: "Create account"
    pub marker: String,

    /// Client signature sent as User-Agent
    /// Default: "mail-probe/<version>"
    pub user_agent: String,

    /// Timeout for each individual probe attempt
    /// Default: 10 seconds
    pub timeout: Duration,

    /// Maximum probe attempts per email
    /// Default: 2, Range: 1-10
    pub max_attempts: u32,

    /// Maximum number of records processed concurrently
    /// Default: 10, Range: 1-100
    pub pool_size: usize,

    /// Directory holding the four output files
    /// Default: current directory
    pub output_dir: PathBuf,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            params: Vec::new(),
            email_param: DEFAULT_EMAIL_PARAM.to_string(),
            marker: DEFAULT_MARKER.to_string(),
            user_agent: format!("mail-probe/{}", crate::VERSION),
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            pool_size: DEFAULT_POOL_SIZE,
            output_dir: PathBuf::from("."),
        }
    }
}

impl ProbeConfig {
    /// Set the endpoint to probe.
    pub fn with_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Add a fixed query parameter.
    pub fn with_param<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set the marker text.
    pub fn with_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.marker = marker.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry ceiling, capped to 1-10.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.clamp(1, 10);
        self
    }

    /// Set the pool size, capped to 1-100.
    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.clamp(1, 100);
        self
    }

    /// Set the output directory.
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Paths of the output channels for this configuration.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::in_dir(&self.output_dir)
    }
}
