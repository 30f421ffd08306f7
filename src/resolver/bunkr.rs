//! Resolver for bunkr-family item pages.
//!
//! An item page usually embeds its media element directly; when it does
//! not, but still looks like a single-file gallery page, the CDN probe
//! fallback walks the mirror hosts for the file.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cdn::probe_file_url;
use crate::page::PageDocument;

use super::{ResolveContext, ResolvedItem, UrlResolver};

/// Base host for page-relative bunkr item references.
pub const BUNKR_BASE_URL: &str = "https://bunkr.sk";

/// Resolver for bunkr-family pages.
#[derive(Debug, Default)]
pub struct BunkrResolver;

impl BunkrResolver {
    /// Creates a new `BunkrResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Outcome of scanning an item page body for its media source.
///
/// Computed synchronously so the parsed document never lives across an
/// await point.
#[derive(Debug, PartialEq, Eq)]
enum MediaScan {
    /// A media element was found; the value is its `src`.
    Media(String),
    /// No media element, but the page carries a gallery-style heading:
    /// the file should be probed on the CDN hosts.
    GalleryHeading,
    /// Nothing recognizable on the page.
    Nothing,
}

/// Scans a page body for a media source.
///
/// Priority is fixed and independent of document order: a `<source>`
/// element wins over a `<media-player>` element, which wins over the
/// styled `<img>`.
fn scan_for_media(body: &str) -> MediaScan {
    let doc = PageDocument::parse(body);

    let media_src = doc
        .first("source")
        .and_then(|node| node.attr("src"))
        .or_else(|| doc.first("media-player").and_then(|node| node.attr("src")))
        .or_else(|| {
            doc.first_with_class("img", "max-h-full")
                .and_then(|node| node.attr("src"))
        });

    if let Some(src) = media_src {
        return MediaScan::Media(src.to_string());
    }

    if doc.first_with_class("h1", "truncate").is_some() {
        MediaScan::GalleryHeading
    } else {
        MediaScan::Nothing
    }
}

/// Normalizes page-relative item references against the bunkr base host.
fn normalize_page_url(url: &str) -> String {
    if url.starts_with('/') {
        format!("{BUNKR_BASE_URL}{url}")
    } else {
        url.to_string()
    }
}

#[async_trait]
impl UrlResolver for BunkrResolver {
    fn name(&self) -> &'static str {
        "bunkr"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>, page_url: &str) -> Option<ResolvedItem> {
        let url = normalize_page_url(page_url);

        let response = match ctx.client.get(&url).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(url = %url, error = %error, "transport error while resolving");
                return None;
            }
        };
        if response.status().as_u16() != 200 {
            warn!(url = %url, status = response.status().as_u16(), "HTTP error while resolving");
            return None;
        }
        let body = match response.text().await {
            Ok(body) => body,
            Err(error) => {
                warn!(url = %url, error = %error, "failed to read item page body");
                return None;
            }
        };

        match scan_for_media(&body) {
            MediaScan::Media(src) => Some(ResolvedItem::new(src)),
            MediaScan::GalleryHeading => {
                debug!(url = %url, "no media element, falling back to CDN probe");
                probe_file_url(ctx.client, ctx.cdn_hosts, &url, None)
                    .await
                    .map(ResolvedItem::new)
            }
            MediaScan::Nothing => None,
        }
    }
}
