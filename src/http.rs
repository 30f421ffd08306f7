//! Shared HTTP session used across page fetches, CDN probing, and downloads.
//!
//! The session is built once at startup and shared read-only by every
//! concurrent operation in a run. Headers are fixed at construction: a
//! browser User-Agent and the referer the hosting sites expect.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};

/// Browser User-Agent sent with every request.
///
/// The hosting sites serve different markup (or block outright) for
/// non-browser agents, so the session always identifies as a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Referer expected by the bunkr-family CDN hosts.
const SESSION_REFERER: &str = "https://bunkr.sk/";

/// Connect timeout and per-read timeout for every request.
///
/// Transfers are bounded per read, not in total: a large file keeps
/// flowing as long as bytes keep arriving.
const SOCKET_TIMEOUT_SECS: u64 = 5;

/// Builds the shared HTTP session with preset headers and timeouts.
///
/// # Errors
///
/// Returns the underlying builder error if the TLS backend cannot be
/// initialized.
pub fn build_session() -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(REFERER, HeaderValue::from_static(SESSION_REFERER));

    Client::builder()
        .connect_timeout(Duration::from_secs(SOCKET_TIMEOUT_SECS))
        .read_timeout(Duration::from_secs(SOCKET_TIMEOUT_SECS))
        .gzip(true)
        .cookie_store(true)
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .build()
}
