//! Console progress reporting for concurrent downloads.
//!
//! One shared `MultiProgress` keeps concurrently drawn bars from
//! interleaving; each in-flight download gets its own bar, dropped once
//! the transfer settles.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

const BYTES_TEMPLATE: &str = "{msg:<30!} {bytes:>10}/{total_bytes:<10} {wide_bar} {bytes_per_sec}";
const SPINNER_TEMPLATE: &str = "{msg:<30!} {bytes:>10} {spinner} {bytes_per_sec}";

/// Shared handle that hands out per-download progress bars.
#[derive(Clone)]
pub struct ProgressReporter {
    multi: MultiProgress,
}

impl ProgressReporter {
    /// Creates a reporter drawing to stderr.
    #[must_use]
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
        }
    }

    /// Creates a reporter that draws nothing (quiet mode and tests).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
        }
    }

    /// Creates a bar for one file transfer; a known total draws a byte
    /// bar, an unknown one a spinner.
    #[must_use]
    pub fn file_bar(&self, file_name: &str, total_bytes: Option<u64>) -> ProgressBar {
        let (bar, template) = match total_bytes {
            Some(total) => (ProgressBar::new(total), BYTES_TEMPLATE),
            None => (ProgressBar::new_spinner(), SPINNER_TEMPLATE),
        };
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        let bar = bar.with_style(style).with_message(file_name.to_string());
        self.multi.add(bar)
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_bar_with_known_total() {
        let reporter = ProgressReporter::disabled();
        let bar = reporter.file_bar("photo.jpg", Some(1024));
        assert_eq!(bar.length(), Some(1024));
    }

    #[test]
    fn test_file_bar_without_total_is_spinner() {
        let reporter = ProgressReporter::disabled();
        let bar = reporter.file_bar("stream.bin", None);
        assert_eq!(bar.length(), None);
    }
}
