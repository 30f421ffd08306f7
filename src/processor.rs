//! End-to-end orchestration of gallery URLs.
//!
//! The processor drives one input URL at a time: fetch and classify the
//! page, prepare the album directory and ledger, resolve every item,
//! filter by extension and dedup against the ledger, then either export
//! the surviving URLs or hand them to the worker pool. Failures never
//! cross an item boundary; a failed page fetch aborts only that URL.

use std::path::PathBuf;
use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::download::{DownloadTask, DownloadWorkerPool};
use crate::ledger::DownloadLedger;
use crate::page::{GalleryPage, SiteFamily};
use crate::progress::ProgressReporter;
use crate::resolver::{ResolveContext, resolver_for};
use crate::urlinfo::UrlInfo;

/// Base directory used when no custom download path is given.
pub const DEFAULT_BASE_PATH: &str = "downloads";

/// Options shared by every URL in one run.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Download attempts per file, including the first.
    pub retries: u32,
    /// Raw comma-separated extension allow-list; empty accepts all.
    pub extensions: String,
    /// Write resolved URLs to the export list instead of downloading.
    pub export_only: bool,
    /// Custom base download directory.
    pub base_path: Option<PathBuf>,
}

/// Orchestrates gallery URLs end-to-end over a shared session.
pub struct GalleryProcessor {
    client: Client,
    cdn_hosts: Vec<String>,
    options: ProcessOptions,
    pool: DownloadWorkerPool,
}

impl GalleryProcessor {
    /// Creates a processor over the shared session and CDN host list.
    #[must_use]
    pub fn new(
        client: Client,
        cdn_hosts: Vec<String>,
        options: ProcessOptions,
        progress: ProgressReporter,
    ) -> Self {
        let pool = DownloadWorkerPool::new(client.clone(), progress);
        Self {
            client,
            cdn_hosts,
            options,
            pool,
        }
    }

    /// Processes a batch of input URLs strictly in order.
    ///
    /// Each URL's downloads fully drain before the next URL starts.
    pub async fn run_batch(&self, urls: &[String]) {
        for url in urls {
            info!(url = %url, "processing gallery URL");
            self.process_url(url).await;
        }
    }

    /// Processes one gallery URL; any failure aborts this URL only.
    pub async fn process_url(&self, url: &str) {
        let Some(body) = self.fetch_page(url).await else {
            return;
        };

        let page = GalleryPage::from_html(&body, url);
        debug!(
            site = page.site.name(),
            album = %page.album_name,
            items = page.item_refs.len(),
            direct = page.is_direct_link,
            "parsed gallery page"
        );

        let base = self
            .options
            .base_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_PATH));
        let album_dir = base.join(&page.album_name);
        let ledger = match DownloadLedger::open(&album_dir).await {
            Ok(ledger) => Arc::new(ledger),
            Err(error) => {
                warn!(dir = %album_dir.display(), error = %error, "failed to prepare download directory");
                return;
            }
        };

        let allow_list = parse_extension_filter(&self.options.extensions);
        let resolver = resolver_for(page.site);
        let ctx = ResolveContext {
            client: &self.client,
            cdn_hosts: &self.cdn_hosts,
        };

        let mut tasks = Vec::new();
        for item_ref in &page.item_refs {
            let Some(item) = resolver.resolve(&ctx, item_ref).await else {
                warn!(item = %item_ref, "unable to resolve a download URL, skipping item");
                continue;
            };
            let Some(info) = UrlInfo::parse(&item.url) else {
                warn!(url = %item.url, "resolved URL is not parseable, skipping item");
                continue;
            };

            if !allow_list.is_empty() && !allow_list.iter().any(|ext| *ext == info.extension) {
                debug!(file = %info.file_name, extension = %info.extension, "filtered by extension");
                continue;
            }
            if ledger.contains(&item.url) {
                continue;
            }

            if self.options.export_only {
                if let Err(error) = ledger.export_url(&item.url).await {
                    warn!(url = %item.url, error = %error, "failed to export URL");
                }
            } else {
                tasks.push(DownloadTask {
                    url: item.url,
                    name_override: item.name_hint,
                    verify_size: page.site == SiteFamily::Bunkr,
                    max_attempts: self.options.retries,
                });
            }
        }

        if self.options.export_only {
            info!(path = %ledger.export_path().display(), "URL list exported");
            return;
        }

        if tasks.is_empty() {
            info!(album = %page.album_name, "download processing completed");
            return;
        }
        let stats = self.pool.run(tasks, &ledger).await;
        info!(
            album = %page.album_name,
            completed = stats.completed(),
            failed = stats.failed(),
            retried = stats.retried(),
            "download processing completed"
        );
    }

    /// Fetches the gallery page body, logging and returning `None` on any
    /// failure so the batch can continue with the next URL.
    async fn fetch_page(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(url = %url, error = %error, "failed to fetch gallery page");
                return None;
            }
        };
        if response.status().as_u16() != 200 {
            warn!(url = %url, status = response.status().as_u16(), "HTTP error fetching gallery page");
            return None;
        }
        match response.text().await {
            Ok(body) => Some(body),
            Err(error) => {
                warn!(url = %url, error = %error, "failed to read gallery page body");
                None
            }
        }
    }
}

/// Splits the raw allow-list on commas, trimming each entry.
///
/// Entries are compared case-sensitively against the extension including
/// its leading dot, so a filter of `.jpg,.mp4` matches exactly.
fn parse_extension_filter(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|ext| ext.trim().to_string()).collect()
}
