use anyhow::Result as AnyResult;
use tracing::{debug, warn};

use super::mangadex::MangaDexAdapter;
use super::mangaupdates::MangaUpdatesAdapter;
use super::{http, Adapter};
use crate::config::Config;
use crate::error::{ProviderError, Result};
use crate::models::{ChapterContent, Series};

/// What to do when more than one adapter claims a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// Declaration order decides; ambiguity goes unreported
    #[default]
    FirstMatch,
    /// Ambiguity is an error naming every claimant
    RejectAmbiguous,
}

/// Ordered list of adapters
pub struct ProviderRegistry {
    adapters: Vec<Box<dyn Adapter>>,
    policy: SelectionPolicy,
}

impl ProviderRegistry {
    pub fn new(adapters: Vec<Box<dyn Adapter>>, policy: SelectionPolicy) -> Self {
        Self { adapters, policy }
    }

    /// Registry with every shipped adapter, in declaration order
    pub fn from_config(config: &Config) -> AnyResult<Self> {
        let client = http::build_client(&config.http)?;
        let policy = if config.providers.reject_ambiguous {
            SelectionPolicy::RejectAmbiguous
        } else {
            SelectionPolicy::FirstMatch
        };

        let registry = Self::new(
            vec![
                Box::new(MangaDexAdapter::new(
                    client.clone(),
                    &config.providers.mangadex_language,
                )),
                Box::new(MangaUpdatesAdapter::new(client)),
            ],
            policy,
        );
        debug!("Providers: {}", registry.adapter_names().join(", "));
        Ok(registry)
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Pick the adapter responsible for a URL
    pub fn select(&self, url: &str) -> Result<&dyn Adapter> {
        let mut claimants = self.adapters.iter().filter(|a| a.owns_url(url));

        let first = claimants
            .next()
            .ok_or_else(|| ProviderError::NoSupportingAdapter(url.to_string()))?;

        if self.policy == SelectionPolicy::RejectAmbiguous {
            let others: Vec<&'static str> = claimants.map(|a| a.name()).collect();
            if !others.is_empty() {
                let mut providers = vec![first.name()];
                providers.extend(others);
                return Err(ProviderError::AmbiguousUrl {
                    url: url.to_string(),
                    providers,
                });
            }
        }

        debug!("{} handles {}", first.name(), url);
        Ok(first.as_ref())
    }

    /// Series id for a URL, via whichever adapter owns it
    pub fn series_id(&self, url: &str) -> Result<String> {
        let adapter = self.select(url)?;
        adapter
            .series_id(url)
            .ok_or_else(|| ProviderError::UnrecognizedSeriesUrl {
                provider: adapter.name(),
                url: url.to_string(),
            })
    }

    /// Fetch series metadata, tagged with the adapter's reading support
    pub async fn fetch_series(&self, url: &str, series_id: &str) -> Result<Series> {
        let adapter = self.select(url)?;
        let mut series = adapter.fetch_series(series_id).await.map_err(|e| {
            warn!("{} failed for series {}: {}", adapter.name(), series_id, e);
            e
        })?;
        series.supports_reading = adapter.supports_reading();
        series.url = url.to_string();
        Ok(series)
    }

    pub async fn fetch_chapter(
        &self,
        url: &str,
        series_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterContent> {
        let adapter = self.select(url)?;
        if !adapter.supports_reading() {
            return Err(ProviderError::ReadingUnsupported {
                provider: adapter.name(),
            });
        }
        adapter.fetch_chapter(series_id, chapter_id).await
    }
}
