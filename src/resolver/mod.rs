//! Site-specific URL resolution strategies.
//!
//! A resolver turns one gallery item page URL into a directly fetchable
//! file URL. There are exactly two strategies, one per supported site
//! family, selected by [`resolver_for`]; the set is closed on purpose.
//!
//! Resolution failure is an expected outcome, not an error: every variant
//! returns `None` after logging, and the caller skips the item and moves
//! on.

pub mod bunkr;
pub mod cyberdrop;

pub use bunkr::BunkrResolver;
pub use cyberdrop::CyberdropResolver;

use async_trait::async_trait;
use reqwest::Client;

use crate::page::SiteFamily;

/// A fully resolved, directly fetchable download item.
///
/// Never partially filled: resolution either yields a complete item or
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedItem {
    /// Absolute URL of the file itself.
    pub url: String,
    /// Declared size, when the resolving endpoint reports one.
    pub size_hint: Option<u64>,
    /// Preferred on-disk name, when the resolving endpoint reports one.
    pub name_hint: Option<String>,
}

impl ResolvedItem {
    /// Creates a resolved item carrying only a URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            size_hint: None,
            name_hint: None,
        }
    }
}

/// Shared read-only context for resolution.
///
/// Both fields are built once per run and shared across every concurrent
/// resolution; nothing here is mutated after startup.
pub struct ResolveContext<'a> {
    /// The shared HTTP session.
    pub client: &'a Client,
    /// CDN hosts for the probe fallback, in probe order.
    pub cdn_hosts: &'a [String],
}

/// Trait implemented by the two site resolvers.
///
/// # Object Safety
///
/// This trait uses `async_trait` to support dynamic dispatch via
/// `Box<dyn UrlResolver>`. Rust 2024 native async traits are not
/// object-safe, so `async_trait` is required for dispatch by site family.
#[async_trait]
pub trait UrlResolver: Send + Sync {
    /// Returns the resolver's name (e.g., "bunkr").
    fn name(&self) -> &'static str;

    /// Attempts to resolve a gallery item page into a downloadable file.
    ///
    /// Returns `None` when resolution legitimately fails (HTTP error,
    /// missing media element, blocked probe); the failure is logged here
    /// and the caller skips the item.
    async fn resolve(&self, ctx: &ResolveContext<'_>, page_url: &str) -> Option<ResolvedItem>;
}

/// Returns the resolver for a detected site family.
///
/// The mapping is a closed match over the two supported families; adding
/// a site means adding a variant, not registering a handler.
#[must_use]
pub fn resolver_for(site: SiteFamily) -> Box<dyn UrlResolver> {
    match site {
        SiteFamily::Bunkr => Box::new(BunkrResolver::new()),
        SiteFamily::Cyberdrop => Box::new(CyberdropResolver::new()),
    }
}
