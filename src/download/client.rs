//! Single-file transfer: stream a response body to disk and verify it.
//!
//! One call here is one download attempt; the worker pool owns the retry
//! loop around it.

use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_LENGTH;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use crate::progress::ProgressReporter;
use crate::urlinfo::{UrlInfo, sanitize_name};

use super::error::DownloadError;

/// Redirect target signaling site-wide downtime on the bunkr CDN.
///
/// A download answered by this URL is not the requested file; retrying
/// would only re-download the maintenance clip.
pub const MAINTENANCE_URL: &str = "https://bnkr.b-cdn.net/maintenance.mp4";

/// Performs one download attempt for `url` into `album_dir`.
///
/// The on-disk name is the sanitized `name_override` when given, else the
/// URL-derived file name. When `verify_size` is set and the server
/// declared a positive content length, the on-disk size is compared after
/// the transfer; a mismatch fails the attempt and removes nothing — the
/// caller decides what to record.
///
/// # Errors
///
/// Returns [`DownloadError`] on transport failure, non-200 status, the
/// maintenance redirect, IO failure, or a size mismatch.
pub async fn download_file(
    client: &Client,
    progress: &ProgressReporter,
    url: &str,
    album_dir: &Path,
    name_override: Option<&str>,
    verify_size: bool,
) -> Result<PathBuf, DownloadError> {
    let file_name = derive_file_name(url, name_override)?;
    let path = album_dir.join(&file_name);

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DownloadError::timeout(url)
        } else {
            DownloadError::network(url, e)
        }
    })?;

    if response.status().as_u16() != 200 {
        return Err(DownloadError::http_status(url, response.status().as_u16()));
    }
    // The final URL after redirects is what identifies the maintenance page.
    if response.url().as_str() == MAINTENANCE_URL {
        return Err(DownloadError::maintenance(url));
    }

    let declared_length = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let bar = progress.file_bar(&file_name, declared_length);
    let stream_result = stream_to_file(response, url, &path, &bar).await;
    bar.finish_and_clear();

    let bytes_written = match stream_result {
        Ok(bytes) => bytes,
        Err(error) => {
            // Do not leave half a file behind for a failed attempt; a
            // retry recreates it from scratch anyway.
            debug!(path = %path.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&path).await;
            return Err(error);
        }
    };

    if verify_size && let Some(expected) = declared_length.filter(|len| *len > 0) {
        verify_file_size(&path, expected).await?;
    }

    debug!(path = %path.display(), bytes = bytes_written, "download attempt complete");
    Ok(path)
}

/// Derives the on-disk file name from the override or the URL.
fn derive_file_name(url: &str, name_override: Option<&str>) -> Result<String, DownloadError> {
    let derived = match name_override {
        Some(name) => sanitize_name(name),
        None => {
            let info = UrlInfo::parse(url).ok_or_else(|| DownloadError::invalid_url(url))?;
            sanitize_name(&info.file_name)
        }
    };
    if derived.is_empty() {
        warn!(url = %url, "no usable file name could be derived");
        return Err(DownloadError::invalid_url(url));
    }
    Ok(derived)
}

/// Streams the response body to a file, returning bytes written.
async fn stream_to_file(
    response: reqwest::Response,
    url: &str,
    path: &Path,
    bar: &indicatif::ProgressBar,
) -> Result<u64, DownloadError> {
    let file = File::create(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| {
            if e.is_timeout() {
                DownloadError::timeout(url)
            } else {
                DownloadError::network(url, e)
            }
        })?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        bytes_written += chunk.len() as u64;
        bar.inc(chunk.len() as u64);
    }

    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(path, e))?;

    Ok(bytes_written)
}

/// Compares the on-disk size against the declared content length.
async fn verify_file_size(path: &Path, expected: u64) -> Result<(), DownloadError> {
    let actual = tokio::fs::metadata(path)
        .await
        .map_err(|e| DownloadError::io(path, e))?
        .len();
    if actual != expected {
        warn!(
            path = %path.display(),
            expected,
            actual,
            "file size mismatch, the file may be corrupted"
        );
        return Err(DownloadError::integrity(path, expected, actual));
    }
    Ok(())
}
