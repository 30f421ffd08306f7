//! Page-type detection and gallery page construction.
//!
//! A fetched document is classified into one of two supported site
//! families and turned into an immutable [`GalleryPage`]: the album name
//! plus the ordered item references to resolve. Construction is
//! deterministic and performs no network access.

mod document;

pub use document::{PageDocument, PageNode};

use tracing::debug;

use crate::resolver::cyberdrop::CYBERDROP_BASE_URL;
use crate::urlinfo::sanitize_name;

/// Title substring identifying bunkr-family pages.
pub const BUNKR_TITLE_MARKER: &str = "| Bunkr";

/// Album name used when the page carries no recognizable heading.
pub const FALLBACK_ALBUM_NAME: &str = "unknown_album";

/// The two supported site families.
///
/// Pages whose title lacks the bunkr marker are classified as
/// [`SiteFamily::Cyberdrop`]; there is no "unknown site" outcome, so a
/// genuinely unsupported site is treated as cyberdrop-family and fails
/// later at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteFamily {
    Bunkr,
    Cyberdrop,
}

impl SiteFamily {
    /// Short lowercase name for logging.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Bunkr => "bunkr",
            Self::Cyberdrop => "cyberdrop",
        }
    }
}

/// One gallery page, derived once from a fetched document.
///
/// `item_refs` holds page URLs still to be resolved into direct file
/// URLs. Direct-link pages reference themselves: the current page is the
/// single item, and resolving it yields the file URL.
#[derive(Debug, Clone)]
pub struct GalleryPage {
    pub title: String,
    pub site: SiteFamily,
    pub is_direct_link: bool,
    pub album_name: String,
    pub item_refs: Vec<String>,
}

impl GalleryPage {
    /// Classifies the document and extracts album name and item references.
    #[must_use]
    pub fn from_html(body: &str, page_url: &str) -> Self {
        let doc = PageDocument::parse(body);
        let title = doc.title();

        let site = if title.contains(BUNKR_TITLE_MARKER) {
            SiteFamily::Bunkr
        } else {
            SiteFamily::Cyberdrop
        };

        match site {
            SiteFamily::Bunkr => Self::from_bunkr(&doc, title, page_url),
            SiteFamily::Cyberdrop => Self::from_cyberdrop(&doc, title),
        }
    }

    fn from_bunkr(doc: &PageDocument, title: String, page_url: &str) -> Self {
        // A page that is itself the single download target carries a
        // video indicator or a lightbox gallery container.
        let is_direct_link = doc.first_with_class("span", "ic-videos").is_some()
            || doc.first_with_class("div", "lightgallery").is_some();

        if is_direct_link {
            let album_name = doc
                .first_with_class("h1", "text-[20px]")
                .or_else(|| doc.first_with_class("h1", "truncate"))
                .map_or_else(|| FALLBACK_ALBUM_NAME.to_string(), |n| sanitize_name(&n.text()));
            debug!(album = %album_name, "bunkr direct-link page");
            Self {
                title,
                site: SiteFamily::Bunkr,
                is_direct_link: true,
                album_name,
                item_refs: vec![page_url.to_string()],
            }
        } else {
            let album_name = doc
                .first_with_class("h1", "truncate")
                .map_or_else(|| FALLBACK_ALBUM_NAME.to_string(), |n| sanitize_name(&n.text()));
            let item_refs = doc
                .all_with_class("a", "after:absolute")
                .iter()
                .filter_map(|anchor| anchor.attr("href"))
                .map(ToString::to_string)
                .collect();
            Self {
                title,
                site: SiteFamily::Bunkr,
                is_direct_link: false,
                album_name,
                item_refs,
            }
        }
    }

    fn from_cyberdrop(doc: &PageDocument, title: String) -> Self {
        let album_name = doc
            .first_with_id("h1", "title")
            .map_or_else(|| FALLBACK_ALBUM_NAME.to_string(), |n| sanitize_name(&n.text()));
        let item_refs = doc
            .all_with_class("a", "image")
            .iter()
            .filter_map(|anchor| anchor.attr("href"))
            .map(|href| format!("{CYBERDROP_BASE_URL}{href}"))
            .collect();
        Self {
            title,
            site: SiteFamily::Cyberdrop,
            is_direct_link: false,
            album_name,
            item_refs,
        }
    }
}
