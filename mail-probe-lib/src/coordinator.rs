//! Batch coordinator.
//!
//! Records are handed to a fixed-size pool in list order. Each worker runs
//! validate → probe → sink on its own and sends the result over a channel;
//! a single aggregating flow owns the counters and drives progress reporting.
//!
//! ```text
//!  dispatcher ──(permit)──► worker ─┐
//!             ──(permit)──► worker ─┼─► mpsc ─► aggregator (RunCounters, Progress)
//!             ──(permit)──► worker ─┘
//! ```

use crate::error::ProbeError;
use crate::probe::{HttpTransport, ProbeClient, Transport};
use crate::sink::ResultSink;
use crate::types::{Outcome, ProbeConfig, ProbeResult, Progress, RunCounters, RunSummary};
use crate::utils::is_valid_email;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, error, info, warn};

/// Orchestrates one batch run over a list of emails.
pub struct BatchCoordinator<T: Transport = HttpTransport> {
    client: Arc<ProbeClient<T>>,
    sink: Arc<ResultSink>,
    pool_size: usize,
}

impl BatchCoordinator<HttpTransport> {
    /// Build the HTTP probe client and open the sink described by `config`.
    ///
    /// The sink is opened in append mode; the caller decides whether to
    /// [`reset`](ResultSink::reset) it first.
    pub async fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let client = ProbeClient::from_config(config)?;
        let sink = ResultSink::open(config.output_paths()).await?;
        Ok(Self::new(client, sink, config.pool_size))
    }
}

impl<T: Transport> BatchCoordinator<T> {
    /// Create a coordinator from its parts. `pool_size` is raised to at least 1.
    pub fn new(client: ProbeClient<T>, sink: ResultSink, pool_size: usize) -> Self {
        Self {
            client: Arc::new(client),
            sink: Arc::new(sink),
            pool_size: pool_size.max(1),
        }
    }

    pub fn sink(&self) -> &ResultSink {
        &self.sink
    }

    /// Process every email and return the final tally.
    ///
    /// `on_result` runs in the aggregating flow once per record, in
    /// completion order, with the record's result and the progress so far.
    /// The sum of the returned counters always equals `emails.len()`.
    pub async fn run<F>(&self, emails: &[String], mut on_result: F) -> RunSummary
    where
        F: FnMut(&ProbeResult, &Progress),
    {
        let start_time = Instant::now();
        let total = emails.len();
        let mut counters = RunCounters::default();
        let mut seen = vec![false; total];

        info!(total, pool_size = self.pool_size, "batch started");

        let (tx, mut rx) = mpsc::unbounded_channel::<(usize, ProbeResult)>();
        let semaphore = Arc::new(Semaphore::new(self.pool_size));

        let dispatch = async {
            let tx = tx;
            for (index, email) in emails.iter().enumerate() {
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let client = self.client.clone();
                let sink = self.sink.clone();
                let tx = tx.clone();
                let email = email.clone();

                tokio::spawn(async move {
                    let result = process_record(&client, &sink, &email).await;
                    drop(permit);
                    let _ = tx.send((index, result));
                });
            }
        };

        let aggregate = async {
            while let Some((index, result)) = rx.recv().await {
                seen[index] = true;
                debug!(
                    email = %result.email,
                    outcome = ?result.outcome,
                    attempts = result.attempts,
                    elapsed = ?result.check_duration,
                    error = result.error_message.as_deref(),
                    "record finished"
                );
                counters.record(result.outcome);
                on_result(&result, &Progress::new(counters, total));
            }
        };

        tokio::join!(dispatch, aggregate);

        // A worker that died before reporting still owes exactly one outcome.
        for (index, email) in emails.iter().enumerate() {
            if seen[index] {
                continue;
            }
            error!(email = %email, "worker exited without a result");
            if let Err(e) = self.sink.record(email, Outcome::Failed).await {
                error!(email = %email, error = %e, "failed to persist outcome");
            }
            let result = ProbeResult {
                email: email.clone(),
                outcome: Outcome::Failed,
                attempts: 0,
                check_duration: std::time::Duration::ZERO,
                error_message: Some("worker exited without a result".to_string()),
            };
            counters.record(Outcome::Failed);
            on_result(&result, &Progress::new(counters, total));
        }

        let duration = start_time.elapsed();
        info!(
            valid = counters.valid,
            invalid = counters.invalid,
            failed = counters.failed,
            skipped = counters.skipped,
            ?duration,
            "batch finished"
        );

        RunSummary {
            counters,
            total,
            duration,
            paths: self.sink.paths().clone(),
        }
    }
}

/// Validate → probe → sink for one record.
async fn process_record<T: Transport>(
    client: &ProbeClient<T>,
    sink: &ResultSink,
    email: &str,
) -> ProbeResult {
    let result = if is_valid_email(email) {
        client.check(email).await
    } else {
        ProbeResult::skipped(email)
    };

    // The outcome stands even if it could not be persisted.
    if let Err(e) = sink.record(email, result.outcome).await {
        warn!(email, error = %e, "failed to persist outcome");
    }

    result
}
