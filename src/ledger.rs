//! Per-album persisted record of completed downloads, plus the export list.
//!
//! The ledger is one URL per line in an append-only file inside the album
//! directory. A URL appears in the ledger iff its file was fully written
//! to disk in this or a prior run; it is the sole source of truth for
//! "already downloaded". Appends to the ledger and the export list are
//! serialized by a per-ledger lock held only for the write itself, never
//! across network I/O.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// File recording successfully downloaded URLs, one per line.
pub const LEDGER_FILE_NAME: &str = "already_downloaded.txt";

/// File receiving resolved URLs in export mode, one per line.
pub const EXPORT_FILE_NAME: &str = "url_list.txt";

/// Errors from ledger file operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// File system error while preparing or appending to a ledger file.
    #[error("IO error on {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl LedgerError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Thread-safe record of URLs already downloaded into one album directory.
///
/// Opened once per processed gallery URL and shared (by `Arc`) across all
/// download tasks for that album. The on-disk ledger is read once at open;
/// [`DownloadLedger::contains`] answers from that snapshot while
/// [`DownloadLedger::mark_downloaded`] appends to disk.
#[derive(Debug)]
pub struct DownloadLedger {
    dir: PathBuf,
    seen: HashSet<String>,
    file_lock: Mutex<()>,
}

impl DownloadLedger {
    /// Opens the ledger for an album directory.
    ///
    /// Creates the directory and an empty ledger file if absent, then
    /// loads the existing entries into memory.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the directory or ledger file
    /// cannot be created or read.
    pub async fn open(dir: &Path) -> Result<Self, LedgerError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| LedgerError::io(dir, e))?;

        let ledger_path = dir.join(LEDGER_FILE_NAME);
        if tokio::fs::metadata(&ledger_path).await.is_err() {
            tokio::fs::write(&ledger_path, b"")
                .await
                .map_err(|e| LedgerError::io(&ledger_path, e))?;
        }

        let contents = tokio::fs::read_to_string(&ledger_path)
            .await
            .map_err(|e| LedgerError::io(&ledger_path, e))?;
        let seen: HashSet<String> = contents.lines().map(ToString::to_string).collect();
        debug!(dir = %dir.display(), entries = seen.len(), "ledger loaded");

        Ok(Self {
            dir: dir.to_path_buf(),
            seen,
            file_lock: Mutex::new(()),
        })
    }

    /// The album directory this ledger is scoped to.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Path of the ledger file.
    #[must_use]
    pub fn ledger_path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE_NAME)
    }

    /// Path of the export list file.
    #[must_use]
    pub fn export_path(&self) -> PathBuf {
        self.dir.join(EXPORT_FILE_NAME)
    }

    /// Returns true if the URL was recorded as downloaded when the ledger
    /// was opened.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    /// Records a URL as fully downloaded.
    ///
    /// Called by the worker pool after the file has completely landed on
    /// disk (and, for verified downloads, passed the size check).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the append fails.
    pub async fn mark_downloaded(&self, url: &str) -> Result<(), LedgerError> {
        self.append_line(&self.ledger_path(), url).await
    }

    /// Appends a resolved URL to the export list.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Io`] when the append fails.
    pub async fn export_url(&self, url: &str) -> Result<(), LedgerError> {
        self.append_line(&self.export_path(), url).await
    }

    async fn append_line(&self, path: &Path, line: &str) -> Result<(), LedgerError> {
        let _guard = self.file_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| LedgerError::io(path, e))?;
        file.write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(|e| LedgerError::io(path, e))?;
        file.flush().await.map_err(|e| LedgerError::io(path, e))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_creates_directory_and_ledger_file() {
        let temp = TempDir::new().unwrap();
        let album_dir = temp.path().join("my album");

        let ledger = DownloadLedger::open(&album_dir).await.unwrap();

        assert!(album_dir.is_dir());
        assert!(ledger.ledger_path().is_file());
        assert!(!ledger.contains("https://example.com/a.jpg"));
    }

    #[tokio::test]
    async fn test_open_loads_existing_entries() {
        let temp = TempDir::new().unwrap();
        let album_dir = temp.path().join("album");
        std::fs::create_dir_all(&album_dir).unwrap();
        std::fs::write(
            album_dir.join(LEDGER_FILE_NAME),
            "https://cdn.example.com/a.jpg\nhttps://cdn.example.com/b.jpg\n",
        )
        .unwrap();

        let ledger = DownloadLedger::open(&album_dir).await.unwrap();

        assert!(ledger.contains("https://cdn.example.com/a.jpg"));
        assert!(ledger.contains("https://cdn.example.com/b.jpg"));
        assert!(!ledger.contains("https://cdn.example.com/c.jpg"));
    }

    #[tokio::test]
    async fn test_mark_downloaded_appends_one_line() {
        let temp = TempDir::new().unwrap();
        let ledger = DownloadLedger::open(temp.path()).await.unwrap();

        ledger
            .mark_downloaded("https://cdn.example.com/a.jpg")
            .await
            .unwrap();
        ledger
            .mark_downloaded("https://cdn.example.com/b.jpg")
            .await
            .unwrap();

        let contents = std::fs::read_to_string(ledger.ledger_path()).unwrap();
        assert_eq!(
            contents,
            "https://cdn.example.com/a.jpg\nhttps://cdn.example.com/b.jpg\n"
        );
    }

    #[tokio::test]
    async fn test_mark_does_not_touch_export_list() {
        let temp = TempDir::new().unwrap();
        let ledger = DownloadLedger::open(temp.path()).await.unwrap();

        ledger.mark_downloaded("https://x.example/a").await.unwrap();
        ledger.export_url("https://x.example/b").await.unwrap();

        let ledger_contents = std::fs::read_to_string(ledger.ledger_path()).unwrap();
        let export_contents = std::fs::read_to_string(ledger.export_path()).unwrap();
        assert_eq!(ledger_contents, "https://x.example/a\n");
        assert_eq!(export_contents, "https://x.example/b\n");
    }

    #[tokio::test]
    async fn test_concurrent_marks_all_land_intact() {
        let temp = TempDir::new().unwrap();
        let ledger = Arc::new(DownloadLedger::open(temp.path()).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..20 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger
                    .mark_downloaded(&format!("https://cdn.example.com/file{i}.jpg"))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let contents = std::fs::read_to_string(ledger.ledger_path()).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 20);
        for i in 0..20 {
            let expected = format!("https://cdn.example.com/file{i}.jpg");
            assert!(lines.contains(&expected.as_str()), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn test_reopen_sees_marked_urls() {
        let temp = TempDir::new().unwrap();
        {
            let ledger = DownloadLedger::open(temp.path()).await.unwrap();
            ledger.mark_downloaded("https://x.example/a").await.unwrap();
        }
        let reopened = DownloadLedger::open(temp.path()).await.unwrap();
        assert!(reopened.contains("https://x.example/a"));
    }
}
