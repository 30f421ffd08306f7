//! Bounded-concurrency execution of download tasks with per-task retry.
//!
//! One pool run is one batch: every task for one gallery URL. Tasks run
//! in their own Tokio tasks behind a semaphore sized `min(10, tasks)`,
//! and the batch is joined fully before it reports done. A failing task
//! never aborts the batch.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::ledger::DownloadLedger;
use crate::progress::ProgressReporter;

use super::client::download_file;
use super::retry::{FailureType, RETRY_BACKOFF, classify_error};

/// Upper bound on concurrent downloads within one batch.
pub const MAX_POOL_SIZE: usize = 10;

/// One download to perform; consumed exactly once by the pool.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// Resolved file URL.
    pub url: String,
    /// Preferred on-disk name from resolution, if any.
    pub name_override: Option<String>,
    /// Whether to compare the on-disk size against the declared length.
    pub verify_size: bool,
    /// Attempts allowed, including the first.
    pub max_attempts: u32,
}

/// Statistics from one batch run.
///
/// Counters are atomic because concurrent tasks update them; reads after
/// the batch joins see the final values.
#[derive(Debug, Default)]
pub struct BatchStats {
    completed: AtomicUsize,
    failed: AtomicUsize,
    retried: AtomicUsize,
}

impl BatchStats {
    /// Number of tasks that downloaded successfully.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Number of tasks that terminally failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    /// Number of retry sleeps taken across all tasks.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried.load(Ordering::SeqCst)
    }

    fn increment_completed(&self) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
    }

    fn increment_retried(&self) {
        self.retried.fetch_add(1, Ordering::SeqCst);
    }
}

/// Bounded worker pool for one batch of download tasks.
#[derive(Clone)]
pub struct DownloadWorkerPool {
    client: Client,
    progress: ProgressReporter,
}

impl DownloadWorkerPool {
    /// Creates a pool over the shared HTTP session and progress reporter.
    #[must_use]
    pub fn new(client: Client, progress: ProgressReporter) -> Self {
        Self { client, progress }
    }

    /// Runs a batch of tasks to completion and returns its statistics.
    ///
    /// Every task settles (success or exhausted retries) before this
    /// returns; completion order within the batch is unspecified.
    pub async fn run(&self, tasks: Vec<DownloadTask>, ledger: &Arc<DownloadLedger>) -> BatchStats {
        if tasks.is_empty() {
            return BatchStats::default();
        }

        let pool_size = MAX_POOL_SIZE.min(tasks.len());
        debug!(tasks = tasks.len(), pool_size, "starting download batch");

        let semaphore = Arc::new(Semaphore::new(pool_size));
        let stats = Arc::new(BatchStats::default());
        let mut handles = Vec::with_capacity(tasks.len());

        for task in tasks {
            let semaphore = Arc::clone(&semaphore);
            let stats = Arc::clone(&stats);
            let ledger = Arc::clone(ledger);
            let client = self.client.clone();
            let progress = self.progress.clone();

            handles.push(tokio::spawn(async move {
                // The semaphore is never closed while tasks hold it.
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                run_task(&client, &progress, &ledger, &task, &stats).await;
            }));
        }

        for handle in handles {
            if let Err(error) = handle.await {
                warn!(error = %error, "download task panicked");
            }
        }

        Arc::into_inner(stats).unwrap_or_default()
    }
}

/// Runs one task's attempt loop to a terminal outcome.
async fn run_task(
    client: &Client,
    progress: &ProgressReporter,
    ledger: &DownloadLedger,
    task: &DownloadTask,
    stats: &BatchStats,
) {
    let max_attempts = task.max_attempts.max(1);

    for attempt in 1..=max_attempts {
        info!(url = %task.url, attempt, max_attempts, "downloading");

        let result = download_file(
            client,
            progress,
            &task.url,
            ledger.directory(),
            task.name_override.as_deref(),
            task.verify_size,
        )
        .await;

        match result {
            Ok(path) => {
                // The ledger records the resolved URL, not the on-disk name.
                if let Err(error) = ledger.mark_downloaded(&task.url).await {
                    warn!(url = %task.url, error = %error, "downloaded but failed to record in ledger");
                }
                debug!(url = %task.url, path = %path.display(), "download complete");
                stats.increment_completed();
                return;
            }
            Err(error) => match classify_error(&error) {
                FailureType::Transient if attempt < max_attempts => {
                    debug!(url = %task.url, attempt, error = %error, "transient failure, backing off");
                    stats.increment_retried();
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
                FailureType::Transient => {
                    warn!(
                        url = %task.url,
                        attempts = max_attempts,
                        error = %error,
                        "failed to download after exhausting attempts"
                    );
                    stats.increment_failed();
                    return;
                }
                FailureType::Permanent => {
                    warn!(url = %task.url, error = %error, "download failed");
                    stats.increment_failed();
                    return;
                }
            },
        }
    }
}
