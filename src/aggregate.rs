//! Fetch every series in a collection with bounded concurrency

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::error::ProviderError;
use crate::models::{Bookmark, Series, Timestamp};
use crate::providers::ProviderRegistry;

/// Most provider fetches allowed in flight for one collection
pub const FETCH_CONCURRENCY: usize = 3;

/// One bookmark with whatever its provider returned
#[derive(Debug)]
pub struct CollectionEntry {
    pub bookmark: Bookmark,
    pub series: Result<Series, ProviderError>,
}

impl CollectionEntry {
    pub fn updated_at(&self) -> Option<Timestamp> {
        self.series.as_ref().ok().map(|s| s.updated_at)
    }
}

/// Fetch metadata for every bookmark, most recently updated first.
///
/// A failed fetch stays in the result as an error entry instead of failing
/// the batch. Failed entries come after all successful ones, in collection
/// order.
pub async fn aggregate(registry: &ProviderRegistry, bookmarks: &[Bookmark]) -> Vec<CollectionEntry> {
    aggregate_with_limit(registry, bookmarks, FETCH_CONCURRENCY).await
}

async fn aggregate_with_limit(
    registry: &ProviderRegistry,
    bookmarks: &[Bookmark],
    limit: usize,
) -> Vec<CollectionEntry> {
    info!(
        "Fetching {} series ({} at a time)",
        bookmarks.len(),
        limit
    );

    let mut fetched: Vec<(usize, CollectionEntry)> = stream::iter(bookmarks.iter().enumerate())
        .map(|(index, bookmark)| async move {
            let series = registry
                .fetch_series(&bookmark.url, &bookmark.series_id)
                .await;
            let entry = CollectionEntry {
                bookmark: bookmark.clone(),
                series,
            };
            (index, entry)
        })
        .buffer_unordered(limit)
        .collect()
        .await;

    // Completion order is arbitrary; restore collection order before sorting
    fetched.sort_by_key(|(index, _)| *index);

    let (mut entries, failed): (Vec<_>, Vec<_>) = fetched
        .into_iter()
        .map(|(_, entry)| entry)
        .partition(|entry| entry.series.is_ok());

    if !failed.is_empty() {
        warn!("{} of {} series failed to load", failed.len(), bookmarks.len());
    }

    entries.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
    entries.extend(failed);
    entries
}
