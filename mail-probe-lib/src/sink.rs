//! Result sink: the four append-only output channels.
//!
//! `valid`, `invalid` and `failed` emails are appended one per line to their
//! own file; every outcome, `skipped` included, gets a status line in the
//! shared log. All writers go through one lock and each line is a single
//! write, so lines never interleave.

use crate::error::ProbeError;
use crate::types::{Outcome, OutputPaths};
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

struct Channels {
    valid: File,
    invalid: File,
    retry: File,
    log: File,
}

impl Channels {
    fn for_outcome(&mut self, outcome: Outcome) -> Option<&mut File> {
        match outcome {
            Outcome::Valid => Some(&mut self.valid),
            Outcome::Invalid => Some(&mut self.invalid),
            Outcome::Failed => Some(&mut self.retry),
            Outcome::Skipped => None,
        }
    }
}

/// Shared writer for the output channels.
pub struct ResultSink {
    paths: OutputPaths,
    channels: Mutex<Channels>,
}

impl ResultSink {
    /// Open (creating if needed) the four files in append mode.
    ///
    /// Existing content is kept; call [`ResultSink::reset`] to start a run
    /// from empty files.
    pub async fn open(paths: OutputPaths) -> Result<Self, ProbeError> {
        if let Some(parent) = paths.log.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    ProbeError::file_error(
                        parent.to_string_lossy(),
                        format!("Failed to create output directory: {}", e),
                    )
                })?;
            }
        }

        let channels = Channels {
            valid: open_append(&paths.valid).await?,
            invalid: open_append(&paths.invalid).await?,
            retry: open_append(&paths.retry).await?,
            log: open_append(&paths.log).await?,
        };

        Ok(Self {
            paths,
            channels: Mutex::new(channels),
        })
    }

    /// Truncate all four files to empty.
    ///
    /// Destroys the previous run's output; there is no way back.
    pub async fn reset(&self) -> Result<(), ProbeError> {
        let mut channels = self.channels.lock().await;
        let Channels {
            valid,
            invalid,
            retry,
            log,
        } = &mut *channels;

        for (file, path) in [valid, invalid, retry, log].into_iter().zip(self.paths.all()) {
            file.set_len(0).await.map_err(|e| {
                ProbeError::file_error(path.to_string_lossy(), format!("Failed to truncate: {}", e))
            })?;
        }

        debug!(paths = ?self.paths, "output channels reset");
        Ok(())
    }

    /// Persist one outcome: per-outcome file (if any) plus the log line.
    pub async fn record(&self, email: &str, outcome: Outcome) -> Result<(), ProbeError> {
        let mut channels = self.channels.lock().await;

        if let (Some(file), Some(path)) =
            (channels.for_outcome(outcome), self.paths.for_outcome(outcome))
        {
            write_line(file, email, path).await?;
        }

        let status = outcome.status_line(email);
        write_line(&mut channels.log, &status, &self.paths.log).await
    }

    pub fn paths(&self) -> &OutputPaths {
        &self.paths
    }
}

async fn open_append(path: &Path) -> Result<File, ProbeError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| ProbeError::file_error(path.to_string_lossy(), format!("Failed to open: {}", e)))
}

async fn write_line(file: &mut File, line: &str, path: &Path) -> Result<(), ProbeError> {
    let mut buf = String::with_capacity(line.len() + 1);
    buf.push_str(line);
    buf.push('\n');

    let to_error = |e: std::io::Error| {
        ProbeError::file_error(path.to_string_lossy(), format!("Failed to write: {}", e))
    };

    file.write_all(buf.as_bytes()).await.map_err(to_error)?;
    file.flush().await.map_err(to_error)
}
