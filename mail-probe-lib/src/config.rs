//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `MP_*`
//! environment variables, and layering both over the built-in defaults.

use crate::error::ProbeError;
use crate::types::ProbeConfig;
use reqwest::Url;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    /// Probe target and retry settings
    pub probe: Option<ProbeSection>,

    /// Worker pool and output settings
    pub run: Option<RunSection>,
}

/// `[probe]` table.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProbeSection {
    /// Registration endpoint URL
    pub endpoint: Option<String>,

    /// Name of the query parameter carrying the email
    pub email_param: Option<String>,

    /// Marker text signalling a fresh signup prompt
    pub marker: Option<String>,

    /// Client signature (User-Agent)
    pub user_agent: Option<String>,

    /// Per-attempt timeout (as string, e.g., "10s", "1m")
    pub timeout: Option<String>,

    /// Retry ceiling
    pub max_attempts: Option<u32>,

    /// Fixed query parameters (`[probe.params]`)
    pub params: Option<BTreeMap<String, String>>,
}

/// `[run]` table.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunSection {
    /// Number of concurrent workers
    pub pool_size: Option<usize>,

    /// Directory for the output files
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    /// Layer this file's values over `config`.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(probe) = &self.probe {
            if let Some(endpoint) = &probe.endpoint {
                config.endpoint = endpoint.clone();
            }
            if let Some(email_param) = &probe.email_param {
                config.email_param = email_param.clone();
            }
            if let Some(marker) = &probe.marker {
                config.marker = marker.clone();
            }
            if let Some(user_agent) = &probe.user_agent {
                config.user_agent = user_agent.clone();
            }
            if let Some(timeout) = probe.timeout.as_deref().and_then(parse_timeout_string) {
                config.timeout = Duration::from_secs(timeout);
            }
            if let Some(max_attempts) = probe.max_attempts {
                config.max_attempts = max_attempts;
            }
            if let Some(params) = &probe.params {
                config.params = params
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
            }
        }

        if let Some(run) = &self.run {
            if let Some(pool_size) = run.pool_size {
                config.pool_size = pool_size;
            }
            if let Some(output_dir) = &run.output_dir {
                config.output_dir = output_dir.clone();
            }
        }

        config
    }
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager;

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new() -> Self {
        Self
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, ProbeError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ProbeError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ProbeError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;

        // Validate the loaded configuration
        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is lowest, then the home directory, then the working
    /// directory. A file that fails to parse or validate is an error; a
    /// missing one is skipped.
    pub fn discover_and_load(&self) -> Result<FileConfig, ProbeError> {
        let mut merged_config = FileConfig::default();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            let config = self.load_file(&path)?;
            debug!(path = %path.display(), "loaded config file");
            merged_config = self.merge_configs(merged_config, config);
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./mail-probe.toml", "./.mail-probe.toml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Some(path.to_path_buf());
            }
        }

        None
    }

    /// Get the global configuration file path in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".mail-probe.toml");
        path.exists().then_some(path)
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("mail-probe").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            probe: match (lower.probe, higher.probe) {
                (Some(mut lower_probe), Some(higher_probe)) => {
                    if higher_probe.endpoint.is_some() {
                        lower_probe.endpoint = higher_probe.endpoint;
                    }
                    if higher_probe.email_param.is_some() {
                        lower_probe.email_param = higher_probe.email_param;
                    }
                    if higher_probe.marker.is_some() {
                        lower_probe.marker = higher_probe.marker;
                    }
                    if higher_probe.user_agent.is_some() {
                        lower_probe.user_agent = higher_probe.user_agent;
                    }
                    if higher_probe.timeout.is_some() {
                        lower_probe.timeout = higher_probe.timeout;
                    }
                    if higher_probe.max_attempts.is_some() {
                        lower_probe.max_attempts = higher_probe.max_attempts;
                    }
                    // Parameter sets belong to one endpoint; never mix two.
                    if higher_probe.params.is_some() {
                        lower_probe.params = higher_probe.params;
                    }
                    Some(lower_probe)
                }
                (None, Some(higher_probe)) => Some(higher_probe),
                (Some(lower_probe), None) => Some(lower_probe),
                (None, None) => None,
            },
            run: match (lower.run, higher.run) {
                (Some(mut lower_run), Some(higher_run)) => {
                    if higher_run.pool_size.is_some() {
                        lower_run.pool_size = higher_run.pool_size;
                    }
                    if higher_run.output_dir.is_some() {
                        lower_run.output_dir = higher_run.output_dir;
                    }
                    Some(lower_run)
                }
                (None, Some(higher_run)) => Some(higher_run),
                (Some(lower_run), None) => Some(lower_run),
                (None, None) => None,
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), ProbeError> {
        if let Some(probe) = &config.probe {
            if let Some(endpoint) = &probe.endpoint {
                validate_endpoint(endpoint)?;
            }

            if let Some(timeout_str) = &probe.timeout {
                if parse_timeout_string(timeout_str).is_none() {
                    return Err(ProbeError::config(format!(
                        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                        timeout_str
                    )));
                }
            }

            if let Some(attempts) = probe.max_attempts {
                if attempts == 0 || attempts > 10 {
                    return Err(ProbeError::config("max_attempts must be between 1 and 10"));
                }
            }

            if let Some(marker) = &probe.marker {
                if marker.is_empty() {
                    return Err(ProbeError::config("marker cannot be empty"));
                }
            }

            if let Some(email_param) = &probe.email_param {
                if email_param.trim().is_empty() {
                    return Err(ProbeError::config("email_param cannot be empty"));
                }
            }
        }

        if let Some(run) = &config.run {
            if let Some(pool_size) = run.pool_size {
                if pool_size == 0 || pool_size > 100 {
                    return Err(ProbeError::config("pool_size must be between 1 and 100"));
                }
            }
        }

        Ok(())
    }
}

/// Parse an endpoint, requiring an absolute http(s) URL with a host.
pub fn validate_endpoint(endpoint: &str) -> Result<Url, ProbeError> {
    let endpoint = endpoint.trim();
    let url = Url::parse(endpoint).map_err(|e| {
        ProbeError::config(format!("Invalid endpoint '{}': {}", endpoint, e))
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(ProbeError::config(format!(
                "Invalid endpoint '{}': scheme must be http or https, got {}",
                endpoint, scheme
            )));
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(ProbeError::config(format!(
            "Invalid endpoint '{}': missing host",
            endpoint
        )));
    }

    Ok(url)
}

/// Environment variable configuration.
///
/// This represents configuration values that can be set via MP_* environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub endpoint: Option<String>,
    pub email_param: Option<String>,
    pub marker: Option<String>,
    pub user_agent: Option<String>,
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
    pub pool_size: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl EnvConfig {
    /// Layer these values over `config`.
    pub fn apply_to(&self, mut config: ProbeConfig) -> ProbeConfig {
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(email_param) = &self.email_param {
            config.email_param = email_param.clone();
        }
        if let Some(marker) = &self.marker {
            config.marker = marker.clone();
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.max_attempts = max_attempts;
        }
        if let Some(pool_size) = self.pool_size {
            config.pool_size = pool_size;
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        config
    }
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

/// Parse `MP_*` values from any lookup function.
pub fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    // MP_ENDPOINT - registration endpoint
    if let Some(endpoint) = non_empty("MP_ENDPOINT") {
        match validate_endpoint(&endpoint) {
            Ok(_) => {
                debug!(endpoint = %endpoint, "using MP_ENDPOINT");
                env_config.endpoint = Some(endpoint);
            }
            Err(e) => warn!("ignoring MP_ENDPOINT: {}", e),
        }
    }

    // MP_EMAIL_PARAM - name of the email query parameter
    if let Some(email_param) = non_empty("MP_EMAIL_PARAM") {
        env_config.email_param = Some(email_param);
    }

    // MP_MARKER - signup marker text (kept verbatim, spaces included)
    if let Some(marker) = lookup("MP_MARKER").filter(|v| !v.is_empty()) {
        env_config.marker = Some(marker);
    }

    // MP_USER_AGENT - client signature
    if let Some(user_agent) = non_empty("MP_USER_AGENT") {
        env_config.user_agent = Some(user_agent);
    }

    // MP_TIMEOUT - per-attempt timeout
    if let Some(timeout_str) = non_empty("MP_TIMEOUT") {
        match parse_timeout_string(&timeout_str) {
            Some(secs) => env_config.timeout = Some(Duration::from_secs(secs)),
            None => warn!(
                "Invalid MP_TIMEOUT='{}', use format like '5s', '30s', '2m'",
                timeout_str
            ),
        }
    }

    // MP_MAX_ATTEMPTS - retry ceiling
    if let Some(val) = non_empty("MP_MAX_ATTEMPTS") {
        match val.trim().parse::<u32>() {
            Ok(attempts) if (1..=10).contains(&attempts) => {
                env_config.max_attempts = Some(attempts)
            }
            _ => warn!("Invalid MP_MAX_ATTEMPTS='{}', must be 1-10", val),
        }
    }

    // MP_POOL_SIZE - concurrent workers
    if let Some(val) = non_empty("MP_POOL_SIZE") {
        match val.trim().parse::<usize>() {
            Ok(pool_size) if (1..=100).contains(&pool_size) => {
                env_config.pool_size = Some(pool_size)
            }
            _ => warn!("Invalid MP_POOL_SIZE='{}', must be 1-100", val),
        }
    }

    // MP_OUTPUT_DIR - output directory
    if let Some(dir) = non_empty("MP_OUTPUT_DIR") {
        env_config.output_dir = Some(PathBuf::from(dir));
    }

    // MP_CONFIG - explicit config file
    if let Some(path) = non_empty("MP_CONFIG") {
        env_config.config = Some(PathBuf::from(path));
    }

    env_config
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
pub(crate) fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let secs = if let Some(s) = timeout_str.strip_suffix('s') {
        s.parse::<u64>().ok()
    } else if let Some(m) = timeout_str.strip_suffix('m') {
        m.parse::<u64>().ok().map(|m| m * 60)
    } else {
        // Assume seconds if no unit
        timeout_str.parse::<u64>().ok()
    };

    secs.filter(|&s| s > 0)
}
