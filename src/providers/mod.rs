//! Provider adapters and the registry that dispatches URLs to them

pub mod http;
pub mod mangadex;
pub mod mangaupdates;
mod registry;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::Result;
use crate::models::{ChapterContent, Series};

pub use registry::{ProviderRegistry, SelectionPolicy};

#[cfg(test)]
pub(crate) use registry::testing;

/// Capabilities every provider exposes
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Provider name (for logging and error messages)
    fn name(&self) -> &'static str;

    /// Whether this provider handles the given URL. Must not do I/O.
    fn owns_url(&self, url: &str) -> bool;

    /// Extract the provider-local series id from a series URL
    fn series_id(&self, url: &str) -> Option<String>;

    /// Fetch series metadata and its chapter list
    async fn fetch_series(&self, series_id: &str) -> Result<Series>;

    /// Fetch the pages of one chapter
    async fn fetch_chapter(&self, series_id: &str, chapter_id: &str) -> Result<ChapterContent>;

    /// Whether `fetch_chapter` returns content for this provider
    fn supports_reading(&self) -> bool;
}

/// Parse a URL, assuming https when the scheme is missing
pub fn parse_url(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains("://") {
        Url::parse(raw).ok()
    } else {
        Url::parse(&format!("https://{}", raw)).ok()
    }
}

/// True when the URL's host is `domain` or a subdomain of it
pub fn host_matches(raw: &str, domain: &str) -> bool {
    parse_url(raw)
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| host == domain || host.ends_with(&format!(".{}", domain)))
}
