//! MangaDex adapter (JSON API, chapters readable)

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use super::http::{parse_timestamp, send_json};
use super::{host_matches, parse_url, Adapter};
use crate::error::{ProviderError, Result};
use crate::models::{Chapter, ChapterContent, Series};

const NAME: &str = "mangadex";
const DOMAIN: &str = "mangadex.org";
const API_BASE: &str = "https://api.mangadex.org";
const FEED_LIMIT: u32 = 500;

// ============================================================================
// API Response Structs
// ============================================================================

#[derive(Debug, Deserialize)]
struct MangaResponse {
    data: MangaData,
}

#[derive(Debug, Deserialize)]
struct MangaData {
    id: String,
    attributes: MangaAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MangaAttributes {
    #[serde(default)]
    title: HashMap<String, String>,
    updated_at: String,
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    data: Vec<FeedChapter>,
}

#[derive(Debug, Deserialize)]
struct FeedChapter {
    id: String,
    attributes: FeedChapterAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedChapterAttributes {
    volume: Option<String>,
    chapter: Option<String>,
    title: Option<String>,
    publish_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtHomeResponse {
    base_url: String,
    chapter: AtHomeChapter,
}

#[derive(Debug, Deserialize)]
struct AtHomeChapter {
    hash: String,
    #[serde(default)]
    data: Vec<String>,
}

// ============================================================================
// Adapter
// ============================================================================

pub struct MangaDexAdapter {
    client: reqwest::Client,
    language: String,
}

impl MangaDexAdapter {
    pub fn new(client: reqwest::Client, language: &str) -> Self {
        Self {
            client,
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl Adapter for MangaDexAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn owns_url(&self, url: &str) -> bool {
        host_matches(url, DOMAIN)
    }

    /// Handles /title/{id}/{slug} and the older /manga/{id}
    fn series_id(&self, url: &str) -> Option<String> {
        let url = parse_url(url)?;
        let mut segments = url.path_segments()?;
        match segments.next()? {
            "title" | "manga" => segments
                .next()
                .filter(|id| !id.is_empty())
                .map(String::from),
            _ => None,
        }
    }

    async fn fetch_series(&self, series_id: &str) -> Result<Series> {
        let encoded = urlencoding::encode(series_id);

        let manga_url = format!("{}/manga/{}", API_BASE, encoded);
        let manga: MangaResponse = send_json(NAME, self.client.get(&manga_url))
            .await?
            .ok_or_else(|| ProviderError::SeriesNotFound {
                provider: NAME,
                series_id: series_id.to_string(),
            })?;

        let feed_url = format!(
            "{}/manga/{}/feed?translatedLanguage[]={}&limit={}&order[chapter]=desc",
            API_BASE,
            encoded,
            urlencoding::encode(&self.language),
            FEED_LIMIT
        );
        let feed = require_feed(series_id, send_json(NAME, self.client.get(&feed_url)).await?)?;

        debug!(
            "MangaDex returned {} chapters for {}",
            feed.data.len(),
            series_id
        );

        into_series(manga.data, feed, &self.language)
    }

    async fn fetch_chapter(&self, series_id: &str, chapter_id: &str) -> Result<ChapterContent> {
        let url = format!(
            "{}/at-home/server/{}",
            API_BASE,
            urlencoding::encode(chapter_id)
        );
        let at_home: AtHomeResponse = send_json(NAME, self.client.get(&url))
            .await?
            .ok_or_else(|| ProviderError::ChapterNotFound {
                series_id: series_id.to_string(),
                chapter_id: chapter_id.to_string(),
            })?;

        Ok(into_content(series_id, chapter_id, at_home))
    }

    fn supports_reading(&self) -> bool {
        true
    }
}

/// The manga lookup already succeeded, so a missing feed is an upstream
/// fault rather than a series without chapters
fn require_feed(series_id: &str, feed: Option<FeedResponse>) -> Result<FeedResponse> {
    feed.ok_or_else(|| ProviderError::SeriesNotFound {
        provider: NAME,
        series_id: series_id.to_string(),
    })
}

/// Pick the title in the preferred language, then English, then anything
fn pick_title(titles: &HashMap<String, String>, language: &str) -> Option<String> {
    titles
        .get(language)
        .or_else(|| titles.get("en"))
        .or_else(|| titles.values().next())
        .cloned()
}

fn into_series(manga: MangaData, feed: FeedResponse, language: &str) -> Result<Series> {
    let mut updated_at = parse_timestamp(NAME, &manga.attributes.updated_at)?;

    let chapters = feed
        .data
        .into_iter()
        .map(|chapter| -> Result<Chapter> {
            let created_at = parse_timestamp(NAME, &chapter.attributes.publish_at)?;
            Ok(Chapter {
                id: chapter.id,
                title: chapter.attributes.title.filter(|t| !t.is_empty()),
                chapter_number: chapter.attributes.chapter,
                volume_number: chapter.attributes.volume,
                created_at,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if let Some(newest) = chapters.iter().map(|c| c.created_at).max() {
        updated_at = updated_at.max(newest);
    }

    Ok(Series {
        title: pick_title(&manga.attributes.title, language).unwrap_or_else(|| manga.id.clone()),
        url: format!("https://{}/title/{}", DOMAIN, manga.id),
        id: manga.id,
        supports_reading: true,
        chapters,
        updated_at,
    })
}

fn into_content(series_id: &str, chapter_id: &str, at_home: AtHomeResponse) -> ChapterContent {
    let pages = at_home
        .chapter
        .data
        .iter()
        .map(|file| {
            format!(
                "{}/data/{}/{}",
                at_home.base_url.trim_end_matches('/'),
                at_home.chapter.hash,
                file
            )
        })
        .collect();

    ChapterContent {
        series_id: series_id.to_string(),
        chapter_id: chapter_id.to_string(),
        pages,
    }
}
