//! CDN host discovery and sequential file probing.
//!
//! The bunkr-family status page lists every CDN node; the list is fetched
//! once per run and shared read-only. When a gallery page exposes no media
//! element, the probe walks the hosts in order until one serves the file.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::page::PageDocument;

/// Status page listing the CDN nodes.
pub const STATUS_PAGE_URL: &str = "https://status.bunkr.ru/";

/// Domain suffix appended to each CDN name fragment from the status page.
pub const CDN_DOMAIN_SUFFIX: &str = ".bunkr.ru";

/// Leading status-page rows that are headers, not CDN names.
const STATUS_HEADER_ROWS: usize = 5;

/// Per-host probe timeout.
const PROBE_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches and parses the CDN host list from the status page.
///
/// Failures are not fatal: a non-200 response or transport error yields
/// an empty list and the probe fallback simply reports itself unusable.
pub async fn fetch_cdn_hosts(client: &Client) -> Vec<String> {
    let response = match client.get(STATUS_PAGE_URL).send().await {
        Ok(response) => response,
        Err(error) => {
            warn!(error = %error, "failed to reach the CDN status page");
            return Vec::new();
        }
    };

    if response.status().as_u16() != 200 {
        warn!(
            status = response.status().as_u16(),
            "HTTP error while fetching the CDN host list"
        );
        return Vec::new();
    }

    match response.text().await {
        Ok(body) => parse_cdn_hosts(&body),
        Err(error) => {
            warn!(error = %error, "failed to read the CDN status page body");
            Vec::new()
        }
    }
}

/// Extracts CDN host names from the status page markup.
///
/// Every `<p class="flex-1">` entry past the header rows is a CDN name
/// fragment; lowercased and suffixed it becomes a probe host.
#[must_use]
pub fn parse_cdn_hosts(body: &str) -> Vec<String> {
    let doc = PageDocument::parse(body);
    doc.all_with_class("p", "flex-1")
        .iter()
        .skip(STATUS_HEADER_ROWS)
        .map(|entry| format!("{}{CDN_DOMAIN_SUFFIX}", entry.text().trim().to_lowercase()))
        .collect()
}

/// Probes the CDN hosts in order for the file behind a gallery page URL.
///
/// With an explicit `file_name` the candidate is `https://{host}/{name}`;
/// otherwise the page URL must contain `/d/` and everything after it is
/// the path. Returns the first candidate answering 200. A 404 moves on to
/// the next host; a 403 is a hard block and aborts, as does any other
/// status. Transport failures are treated as "try the next host".
pub async fn probe_file_url(
    client: &Client,
    hosts: &[String],
    page_url: &str,
    file_name: Option<&str>,
) -> Option<String> {
    let candidates = candidate_urls(hosts, page_url, file_name)?;
    probe_candidates(client, page_url, &candidates).await
}

/// Builds the ordered candidate URLs for a probe, one per host.
///
/// Returns `None` when the host list is empty or no file path can be
/// derived from the page URL.
#[must_use]
pub fn candidate_urls(
    hosts: &[String],
    page_url: &str,
    file_name: Option<&str>,
) -> Option<Vec<String>> {
    if hosts.is_empty() {
        warn!(url = %page_url, "CDN host list is empty, unable to probe");
        return None;
    }

    let path = match file_name {
        Some(name) => name.to_string(),
        None => {
            let Some(pos) = page_url.find("/d/") else {
                warn!(url = %page_url, "expected '/d/' in page URL");
                return None;
            };
            page_url[pos + 3..].to_string()
        }
    };

    Some(
        hosts
            .iter()
            .map(|host| format!("https://{host}/{path}"))
            .collect(),
    )
}

/// Walks candidate URLs sequentially and returns the first that serves
/// the file.
pub async fn probe_candidates(
    client: &Client,
    page_url: &str,
    candidates: &[String],
) -> Option<String> {
    for candidate in candidates {
        let response = match client.get(candidate).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) => response,
            Err(error) => {
                debug!(candidate = %candidate, error = %error, "probe transport error, trying next host");
                continue;
            }
        };

        match response.status().as_u16() {
            200 => return Some(candidate.clone()),
            404 => continue,
            403 => {
                warn!(url = %page_url, "request blocked while probing CDN hosts");
                return None;
            }
            status => {
                warn!(url = %page_url, status, "HTTP error while probing CDN hosts");
                return None;
            }
        }
    }
    None
}
