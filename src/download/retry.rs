//! Failure classification and retry constants for download tasks.
//!
//! Only transport-class failures are worth retrying: the connection may
//! recover, the timeout may not repeat. Everything else (an error status,
//! a maintenance redirect, a local IO failure, a size mismatch) will fail
//! the same way again, so the task stops immediately.

use std::time::Duration;

use super::DownloadError;

/// Default attempts per task, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Fixed delay between attempts after a transport failure.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Classification of a failed download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// Transport failure that may succeed on retry.
    ///
    /// Examples: connection refused, timeout, interrupted body stream.
    Transient,

    /// Failure that will not succeed regardless of retries.
    ///
    /// Examples: non-200 status, maintenance redirect, size mismatch,
    /// local IO error.
    Permanent,
}

/// Classifies a download error for the retry decision.
#[must_use]
pub fn classify_error(error: &DownloadError) -> FailureType {
    match error {
        DownloadError::Network { .. } | DownloadError::Timeout { .. } => FailureType::Transient,
        DownloadError::HttpStatus { .. }
        | DownloadError::Maintenance { .. }
        | DownloadError::Io { .. }
        | DownloadError::InvalidUrl { .. }
        | DownloadError::Integrity { .. } => FailureType::Permanent,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_timeout_transient() {
        let error = DownloadError::timeout("https://cdn.example.com/a.jpg");
        assert_eq!(classify_error(&error), FailureType::Transient);
    }

    #[test]
    fn test_classify_http_status_permanent() {
        for status in [404, 403, 500, 503] {
            let error = DownloadError::http_status("https://cdn.example.com/a.jpg", status);
            assert_eq!(
                classify_error(&error),
                FailureType::Permanent,
                "status {status} must not be retried"
            );
        }
    }

    #[test]
    fn test_classify_maintenance_permanent() {
        let error = DownloadError::maintenance("https://bunkr.sk/v/clip");
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    #[test]
    fn test_classify_integrity_permanent() {
        let error = DownloadError::integrity("/tmp/a.jpg", 1000, 900);
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    #[test]
    fn test_classify_io_permanent() {
        let io_error = std::io::Error::new(std::io::ErrorKind::StorageFull, "full");
        let error = DownloadError::io("/tmp/a.jpg", io_error);
        assert_eq!(classify_error(&error), FailureType::Permanent);
    }

    #[test]
    fn test_backoff_is_fixed_two_seconds() {
        assert_eq!(RETRY_BACKOFF, Duration::from_secs(2));
    }

    #[test]
    fn test_default_max_attempts() {
        assert_eq!(DEFAULT_MAX_ATTEMPTS, 10);
    }
}
