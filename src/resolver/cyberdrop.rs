//! Resolver for cyberdrop-family item pages.
//!
//! Cyberdrop exposes a JSON endpoint for every file page: rewriting the
//! `/f/` path segment to `/api/f/` yields `{url, name}` directly, so no
//! markup scanning is needed. There is no CDN fallback for this family.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use super::{ResolveContext, ResolvedItem, UrlResolver};

/// Canonical host for cyberdrop item references.
pub const CYBERDROP_BASE_URL: &str = "https://cyberdrop.me";

/// Resolver for cyberdrop-family pages.
#[derive(Debug, Default)]
pub struct CyberdropResolver;

impl CyberdropResolver {
    /// Creates a new `CyberdropResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

/// Payload of the cyberdrop file API.
#[derive(Debug, Deserialize)]
struct FileApiPayload {
    url: String,
    name: Option<String>,
}

/// Rewrites a file page URL into its API endpoint.
fn api_endpoint(page_url: &str) -> String {
    page_url.replace("/f/", "/api/f/")
}

#[async_trait]
impl UrlResolver for CyberdropResolver {
    fn name(&self) -> &'static str {
        "cyberdrop"
    }

    async fn resolve(&self, ctx: &ResolveContext<'_>, page_url: &str) -> Option<ResolvedItem> {
        let api_url = api_endpoint(page_url);

        let response = match ctx.client.get(&api_url).send().await {
            Ok(response) => response,
            Err(error) => {
                warn!(url = %api_url, error = %error, "transport error while resolving");
                return None;
            }
        };
        if response.status().as_u16() != 200 {
            warn!(url = %api_url, status = response.status().as_u16(), "HTTP error while resolving");
            return None;
        }

        match response.json::<FileApiPayload>().await {
            Ok(payload) => Some(ResolvedItem {
                url: payload.url,
                size_hint: None,
                name_hint: payload.name,
            }),
            Err(error) => {
                warn!(url = %api_url, error = %error, "failed to decode file API payload");
                None
            }
        }
    }
}
