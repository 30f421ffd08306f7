//! Concurrent file downloads with retry and integrity verification.
//!
//! The [`DownloadWorkerPool`] executes one batch of [`DownloadTask`]s
//! behind a bounded semaphore, retrying transport failures with a fixed
//! backoff and recording successes in the album ledger. The actual
//! transfer streams response bodies to disk chunk by chunk.

mod client;
mod error;
mod pool;
mod retry;

pub use client::{MAINTENANCE_URL, download_file};
pub use error::DownloadError;
pub use pool::{BatchStats, DownloadTask, DownloadWorkerPool, MAX_POOL_SIZE};
pub use retry::{DEFAULT_MAX_ATTEMPTS, FailureType, RETRY_BACKOFF, classify_error};
