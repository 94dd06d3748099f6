//! Collection updates
//!
//! Every operation takes the current bookmarks and returns a new sequence;
//! nothing is modified in place. The store persists the result.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{Bookmark, ReadState, Timestamp};
use crate::providers::parse_url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Series with url '{0}' is already in the collection")]
    Duplicate(String),

    #[error("Series '{0}' is not in the collection")]
    NotFound(String),
}

/// Canonical form of a series URL for duplicate detection.
///
/// Scheme becomes https, a leading "www." is dropped, the fragment and
/// trailing slashes go, and query parameters are sorted.
pub fn normalize_url(raw: &str) -> String {
    let Some(mut url) = parse_url(raw) else {
        return raw.trim().to_lowercase();
    };

    let host = url
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_string());
    if let Some(host) = host {
        let _ = url.set_host(Some(&host));
    }
    if url.scheme() == "http" {
        let _ = url.set_scheme("https");
    }
    url.set_fragment(None);

    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        pairs.sort();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);

    url.to_string().trim_end_matches('/').to_string()
}

/// Short opaque slug for a new collection
pub fn generate_slug(name: &str) -> String {
    let now = chrono::Utc::now();
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(now.timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..5])
}

/// Append a bookmark unless its URL (normalized) or series id is already present
pub fn add_bookmark(
    bookmarks: &[Bookmark],
    bookmark: Bookmark,
) -> Result<Vec<Bookmark>, CollectionError> {
    let normalized = normalize_url(&bookmark.url);
    let duplicate = bookmarks
        .iter()
        .any(|b| b.series_id == bookmark.series_id || normalize_url(&b.url) == normalized);
    if duplicate {
        return Err(CollectionError::Duplicate(bookmark.url));
    }

    Ok(bookmarks
        .iter()
        .cloned()
        .chain(std::iter::once(bookmark))
        .collect())
}

pub fn remove_bookmark(
    bookmarks: &[Bookmark],
    series_id: &str,
) -> Result<Vec<Bookmark>, CollectionError> {
    if !bookmarks.iter().any(|b| b.series_id == series_id) {
        return Err(CollectionError::NotFound(series_id.to_string()));
    }

    Ok(bookmarks
        .iter()
        .filter(|b| b.series_id != series_id)
        .cloned()
        .collect())
}

/// Replace one bookmark's read state; returns the new sequence and the updated bookmark
pub fn set_read_state(
    bookmarks: &[Bookmark],
    series_id: &str,
    state: ReadState,
) -> Result<(Vec<Bookmark>, Bookmark), CollectionError> {
    let current = bookmarks
        .iter()
        .find(|b| b.series_id == series_id)
        .ok_or_else(|| CollectionError::NotFound(series_id.to_string()))?;

    let updated = Bookmark {
        state,
        ..current.clone()
    };

    let next = bookmarks
        .iter()
        .map(|b| {
            if b.series_id == series_id {
                updated.clone()
            } else {
                b.clone()
            }
        })
        .collect();

    Ok((next, updated))
}

/// Mark a series as read as of `now`
pub fn mark_read(
    bookmarks: &[Bookmark],
    series_id: &str,
    now: Timestamp,
) -> Result<(Vec<Bookmark>, Bookmark), CollectionError> {
    set_read_state(bookmarks, series_id, ReadState::ReadAt { last_read_at: now })
}
