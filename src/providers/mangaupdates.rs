//! MangaUpdates adapter (release tracking only, no chapter content)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::send_json;
use super::{host_matches, parse_url, Adapter};
use crate::error::{ProviderError, Result};
use crate::models::{Chapter, ChapterContent, Series};

const NAME: &str = "mangaupdates";
const DOMAIN: &str = "mangaupdates.com";
const API_BASE: &str = "https://api.mangaupdates.com/v1";
const RELEASES_PER_PAGE: u32 = 100;

// ============================================================================
// API Request/Response Structs
// ============================================================================

#[derive(Debug, Deserialize)]
struct SeriesRecord {
    series_id: u64,
    title: String,
    url: Option<String>,
    last_updated: Option<ApiTime>,
}

#[derive(Debug, Deserialize)]
struct ApiTime {
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct ReleaseSearch<'a> {
    search: &'a str,
    search_type: &'a str,
    perpage: u32,
}

#[derive(Debug, Deserialize)]
struct ReleaseSearchResponse {
    #[serde(default)]
    results: Vec<ReleaseResult>,
}

#[derive(Debug, Deserialize)]
struct ReleaseResult {
    record: ReleaseRecord,
}

#[derive(Debug, Deserialize)]
struct ReleaseRecord {
    id: u64,
    title: Option<String>,
    volume: Option<String>,
    chapter: Option<String>,
    release_date: Option<String>,
    time_added: Option<ApiTime>,
}

// ============================================================================
// Adapter
// ============================================================================

pub struct MangaUpdatesAdapter {
    client: reqwest::Client,
}

impl MangaUpdatesAdapter {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Adapter for MangaUpdatesAdapter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn owns_url(&self, url: &str) -> bool {
        host_matches(url, DOMAIN)
    }

    /// Current URLs carry a base-36 id (/series/{id36}/{slug}); legacy ones
    /// use series.html?id={id}. Both map to the numeric API id.
    fn series_id(&self, url: &str) -> Option<String> {
        let url = parse_url(url)?;

        if url.path().ends_with("series.html") {
            return url
                .query_pairs()
                .find(|(key, _)| key == "id")
                .and_then(|(_, value)| value.parse::<u64>().ok())
                .map(|id| id.to_string());
        }

        let mut segments = url.path_segments()?;
        if segments.next()? != "series" {
            return None;
        }
        let encoded = segments.next()?;
        u64::from_str_radix(encoded, 36).ok().map(|id| id.to_string())
    }

    async fn fetch_series(&self, series_id: &str) -> Result<Series> {
        let series_url = format!("{}/series/{}", API_BASE, urlencoding::encode(series_id));
        let record: SeriesRecord = send_json(NAME, self.client.get(&series_url))
            .await?
            .ok_or_else(|| ProviderError::SeriesNotFound {
                provider: NAME,
                series_id: series_id.to_string(),
            })?;

        let search = ReleaseSearch {
            search: series_id,
            search_type: "series",
            perpage: RELEASES_PER_PAGE,
        };
        let releases: ReleaseSearchResponse = send_json(
            NAME,
            self.client
                .post(format!("{}/releases/search", API_BASE))
                .json(&search),
        )
        .await?
        .unwrap_or(ReleaseSearchResponse {
            results: Vec::new(),
        });

        debug!(
            "MangaUpdates returned {} releases for {}",
            releases.results.len(),
            series_id
        );

        into_series(record, releases)
    }

    async fn fetch_chapter(&self, _series_id: &str, _chapter_id: &str) -> Result<ChapterContent> {
        Err(ProviderError::ReadingUnsupported { provider: NAME })
    }

    fn supports_reading(&self) -> bool {
        false
    }
}

/// Release time: when it was added, else midnight UTC of the release date
fn release_time(record: &ReleaseRecord) -> Result<i64> {
    if let Some(added) = &record.time_added {
        return Ok(added.timestamp);
    }

    let date = record.release_date.as_deref().unwrap_or_default();
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| {
            ProviderError::parse(
                NAME,
                format!("release {} has no usable date ('{}')", record.id, date),
            )
        })
}

fn into_series(record: SeriesRecord, releases: ReleaseSearchResponse) -> Result<Series> {
    let chapters = releases
        .results
        .into_iter()
        .map(|result| -> Result<Chapter> {
            let release = result.record;
            Ok(Chapter {
                created_at: release_time(&release)?,
                id: release.id.to_string(),
                title: release.title,
                chapter_number: release.chapter.filter(|c| !c.is_empty()),
                volume_number: release.volume.filter(|v| !v.is_empty()),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let newest_release = chapters.iter().map(|c| c.created_at).max();
    let updated_at = record
        .last_updated
        .map(|t| t.timestamp)
        .into_iter()
        .chain(newest_release)
        .max()
        .unwrap_or(0);

    Ok(Series {
        id: record.series_id.to_string(),
        url: record
            .url
            .unwrap_or_else(|| format!("https://www.{}/series.html?id={}", DOMAIN, record.series_id)),
        title: record.title,
        supports_reading: false,
        chapters,
        updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> MangaUpdatesAdapter {
        MangaUpdatesAdapter::new(reqwest::Client::new())
    }

    #[test]
    fn test_owns_url() {
        let adapter = adapter();
        assert!(adapter.owns_url("https://www.mangaupdates.com/series/abc/slug"));
        assert!(!adapter.owns_url("https://mangadex.org/title/abc"));
    }

    #[test]
    fn test_series_id_base36() {
        let adapter = adapter();
        assert_eq!(
            adapter.series_id("https://www.mangaupdates.com/series/zz/some-title"),
            Some("1295".to_string())
        );
        assert_eq!(adapter.series_id("https://www.mangaupdates.com/series/"), None);
        assert_eq!(adapter.series_id("https://www.mangaupdates.com/releases"), None);
    }

    #[test]
    fn test_series_id_legacy() {
        let adapter = adapter();
        assert_eq!(
            adapter.series_id("https://www.mangaupdates.com/series.html?id=1234"),
            Some("1234".to_string())
        );
        assert_eq!(
            adapter.series_id("https://www.mangaupdates.com/series.html?id=abc"),
            None
        );
    }

    #[test]
    fn test_into_series() {
        let record: SeriesRecord = serde_json::from_str(
            r#"{"series_id": 1295, "title": "Title", "url": "https://www.mangaupdates.com/series/zz/title",
                "last_updated": {"timestamp": 100, "as_rfc3339": "x", "as_string": "y"}}"#,
        )
        .unwrap();
        let releases: ReleaseSearchResponse = serde_json::from_str(
            r#"{"total_hits": 2, "results": [
                {"record": {"id": 7, "title": "Title", "volume": "", "chapter": "10-12", "release_date": "2023-01-05"}},
                {"record": {"id": 6, "title": "Title", "volume": "1", "chapter": "9", "release_date": "2022-12-01",
                            "time_added": {"timestamp": 50}}}
            ]}"#,
        )
        .unwrap();

        let series = into_series(record, releases).unwrap();
        assert!(!series.supports_reading);
        assert_eq!(series.id, "1295");
        assert_eq!(series.chapters[0].id, "7");
        assert_eq!(series.chapters[0].volume_number, None);
        assert_eq!(series.chapters[0].chapter_value(), Some(10.0));
        assert_eq!(series.chapters[0].created_at, 1_672_876_800);
        assert_eq!(series.chapters[1].created_at, 50);
        assert_eq!(series.updated_at, 1_672_876_800);
    }

    #[test]
    fn test_release_without_date_is_parse_error() {
        let releases: ReleaseSearchResponse = serde_json::from_str(
            r#"{"results": [{"record": {"id": 1, "title": null, "volume": null, "chapter": "1", "release_date": null}}]}"#,
        )
        .unwrap();
        let record: SeriesRecord =
            serde_json::from_str(r#"{"series_id": 1, "title": "T", "url": null, "last_updated": null}"#)
                .unwrap();
        assert!(matches!(
            into_series(record, releases),
            Err(ProviderError::Parse { provider: "mangaupdates", .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_chapter_unsupported() {
        let err = adapter().fetch_chapter("1", "2").await.unwrap_err();
        assert!(matches!(err, ProviderError::ReadingUnsupported { .. }));
    }
}
