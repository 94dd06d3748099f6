//! Turn a reader's bookmark into a concrete chapter

use crate::models::{Bookmark, Chapter, ReadState, Series, Timestamp};
use crate::reading::order::sorted_newest_first;

/// Outcome of resolving one bookmark against its series
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The provider only exposes metadata, so there is nothing to resolve against
    Unsupported,
    /// The bookmark is unread or already points at a chapter
    NotTimestamped,
    /// Last chapter read, or `None` when nothing was read yet
    Resolved(Option<String>),
}

/// Find the chapter a reader last completed, given the time they last read.
///
/// Chapters published at or before `last_read_at` count as read. When all
/// of them do, the reader is caught up and the newest chapter is returned;
/// otherwise the newest read chapter is. `None` means nothing was read,
/// which includes an empty chapter list.
pub fn resolve_last_read(chapters: &[Chapter], last_read_at: Timestamp) -> Option<String> {
    let ordered = sorted_newest_first(chapters);
    let read: Vec<&Chapter> = ordered
        .iter()
        .filter(|chapter| chapter.created_at <= last_read_at)
        .collect();

    if read.len() == ordered.len() {
        return ordered.first().map(|chapter| chapter.id.clone());
    }

    read.first().map(|chapter| chapter.id.clone())
}

pub fn resolve_bookmark(series: &Series, bookmark: &Bookmark) -> Resolution {
    if !series.supports_reading {
        return Resolution::Unsupported;
    }

    match bookmark.state {
        ReadState::ReadAt { last_read_at } => {
            Resolution::Resolved(resolve_last_read(&series.chapters, last_read_at))
        }
        ReadState::Unread | ReadState::ReadThrough { .. } => Resolution::NotTimestamped,
    }
}

/// Reader position within a series
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub last_read: Option<Chapter>,
    pub next_unread: Option<Chapter>,
    pub unread_count: usize,
}

/// Work out what is left to read.
///
/// Metadata-only series have no position to resolve and yield `None`. A
/// chapter bookmark whose chapter has disappeared from the feed counts
/// everything as unread.
pub fn progress(series: &Series, state: &ReadState) -> Option<Progress> {
    if !series.supports_reading {
        return None;
    }

    let ordered = sorted_newest_first(&series.chapters);
    let last_read_id = match state {
        ReadState::Unread => None,
        ReadState::ReadAt { last_read_at } => resolve_last_read(&ordered, *last_read_at),
        ReadState::ReadThrough {
            last_read_chapter_id,
        } => Some(last_read_chapter_id.clone()),
    };

    let position = last_read_id
        .as_deref()
        .and_then(|id| ordered.iter().position(|chapter| chapter.id == id));

    let progress = match position {
        Some(index) => Progress {
            last_read: ordered.get(index).cloned(),
            next_unread: index
                .checked_sub(1)
                .and_then(|prev| ordered.get(prev))
                .cloned(),
            unread_count: index,
        },
        None => Progress {
            last_read: None,
            next_unread: ordered.last().cloned(),
            unread_count: ordered.len(),
        },
    };
    Some(progress)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, number: &str, created_at: Timestamp) -> Chapter {
        Chapter {
            id: id.to_string(),
            title: None,
            chapter_number: Some(number.to_string()),
            volume_number: None,
            created_at,
        }
    }

    fn sample() -> Vec<Chapter> {
        vec![
            chapter("c3", "3", 300),
            chapter("c2", "2", 200),
            chapter("c1", "1", 100),
        ]
    }

    fn series(supports_reading: bool) -> Series {
        Series {
            id: "s1".into(),
            url: "https://mangadex.org/title/s1".into(),
            title: "Sample".into(),
            supports_reading,
            chapters: sample(),
            updated_at: 300,
        }
    }

    #[test]
    fn test_boundary_chapter() {
        assert_eq!(resolve_last_read(&sample(), 250), Some("c2".to_string()));
    }

    #[test]
    fn test_caught_up_returns_newest() {
        assert_eq!(resolve_last_read(&sample(), 300), Some("c3".to_string()));
        assert_eq!(resolve_last_read(&sample(), 10_000), Some("c3".to_string()));
    }

    #[test]
    fn test_caught_up_uses_order_not_feed_position() {
        let chapters = vec![
            chapter("c1", "1", 100),
            chapter("c3", "3", 300),
            chapter("c2", "2", 200),
        ];
        assert_eq!(resolve_last_read(&chapters, 400), Some("c3".to_string()));
    }

    #[test]
    fn test_nothing_read() {
        assert_eq!(resolve_last_read(&sample(), 99), None);
        assert_eq!(resolve_last_read(&[], 500), None);
    }

    #[test]
    fn test_boundary_follows_chapter_order_not_timestamps() {
        // c2 was re-uploaded after c3; by number it is still older
        let chapters = vec![
            chapter("c3", "3", 300),
            chapter("c2", "2", 350),
            chapter("c1", "1", 100),
        ];
        assert_eq!(resolve_last_read(&chapters, 320), Some("c3".to_string()));
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let first = resolve_last_read(&sample(), 250);
        let second = resolve_last_read(&sample(), 250);
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_bookmark_outcomes() {
        let mut bookmark = Bookmark::new("s1", "https://mangadex.org/title/s1");
        assert_eq!(
            resolve_bookmark(&series(true), &bookmark),
            Resolution::NotTimestamped
        );

        bookmark.state = ReadState::ReadAt { last_read_at: 250 };
        assert_eq!(
            resolve_bookmark(&series(true), &bookmark),
            Resolution::Resolved(Some("c2".into()))
        );
        assert_eq!(
            resolve_bookmark(&series(false), &bookmark),
            Resolution::Unsupported
        );

        bookmark.state = ReadState::ReadThrough {
            last_read_chapter_id: "c1".into(),
        };
        assert_eq!(
            resolve_bookmark(&series(true), &bookmark),
            Resolution::NotTimestamped
        );
    }

    fn ids(p: &Progress) -> (Option<&str>, Option<&str>) {
        (
            p.last_read.as_ref().map(|c| c.id.as_str()),
            p.next_unread.as_ref().map(|c| c.id.as_str()),
        )
    }

    #[test]
    fn test_progress_unread() {
        let p = progress(&series(true), &ReadState::Unread).unwrap();
        assert_eq!(ids(&p), (None, Some("c1")));
        assert_eq!(p.unread_count, 3);
    }

    #[test]
    fn test_progress_from_timestamp() {
        let p = progress(&series(true), &ReadState::ReadAt { last_read_at: 150 }).unwrap();
        assert_eq!(ids(&p), (Some("c1"), Some("c2")));
        assert_eq!(p.unread_count, 2);
    }

    #[test]
    fn test_progress_sorts_feed_first() {
        let mut shuffled = series(true);
        shuffled.chapters.reverse();
        let p = progress(&shuffled, &ReadState::ReadAt { last_read_at: 250 }).unwrap();
        assert_eq!(ids(&p), (Some("c2"), Some("c3")));
        assert_eq!(p.unread_count, 1);
    }

    #[test]
    fn test_progress_from_chapter() {
        let caught_up = progress(
            &series(true),
            &ReadState::ReadThrough {
                last_read_chapter_id: "c3".into(),
            },
        )
        .unwrap();
        assert_eq!(caught_up.unread_count, 0);
        assert!(caught_up.next_unread.is_none());

        let missing = progress(
            &series(true),
            &ReadState::ReadThrough {
                last_read_chapter_id: "gone".into(),
            },
        )
        .unwrap();
        assert!(missing.last_read.is_none());
        assert_eq!(missing.unread_count, 3);
    }

    #[test]
    fn test_progress_skips_metadata_only_series() {
        let state = ReadState::ReadAt { last_read_at: 150 };
        assert_eq!(progress(&series(false), &state), None);
        assert_eq!(progress(&series(false), &ReadState::Unread), None);
    }
}
