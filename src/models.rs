use serde::{Deserialize, Serialize};

/// Unix timestamp in seconds
pub type Timestamp = i64;

/// A serialized work at one provider, built fresh from adapter output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: String,
    pub url: String,
    pub title: String,
    pub supports_reading: bool,
    pub chapters: Vec<Chapter>,
    pub updated_at: Timestamp,
}

/// One installment of a series
///
/// Chapter and volume numbers are kept as the provider reported them and
/// parsed on demand, so "12.5", "Extra" and a missing value all survive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub title: Option<String>,
    pub chapter_number: Option<String>,
    pub volume_number: Option<String>,
    pub created_at: Timestamp,
}

impl Chapter {
    pub fn chapter_value(&self) -> Option<f64> {
        self.chapter_number.as_deref().and_then(leading_number)
    }

    pub fn volume_value(&self) -> Option<f64> {
        self.volume_number.as_deref().and_then(leading_number)
    }

    /// Short human label, e.g. "Vol. 3 Ch. 21"
    pub fn label(&self) -> String {
        match (&self.volume_number, &self.chapter_number) {
            (Some(v), Some(c)) => format!("Vol. {} Ch. {}", v, c),
            (None, Some(c)) => format!("Ch. {}", c),
            (Some(v), None) => format!("Vol. {}", v),
            (None, None) => self.title.clone().unwrap_or_else(|| self.id.clone()),
        }
    }
}

/// Pages of a single chapter, in reading order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterContent {
    pub series_id: String,
    pub chapter_id: String,
    pub pages: Vec<String>,
}

/// Where a reader stands in one series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ReadState {
    Unread,
    /// Read as of a point in time
    ReadAt { last_read_at: Timestamp },
    /// Read through a specific chapter
    ReadThrough { last_read_chapter_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub series_id: String,
    pub url: String,
    #[serde(flatten)]
    pub state: ReadState,
}

impl Bookmark {
    pub fn new(series_id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            series_id: series_id.into(),
            url: url.into(),
            state: ReadState::Unread,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub slug: String,
    pub name: String,
    pub bookmarks: Vec<Bookmark>,
}

impl Collection {
    pub fn bookmark(&self, series_id: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.series_id == series_id)
    }
}

/// Parse the leading numeric prefix of a string as a float.
///
/// "12.5 (part 2)" yields 12.5; text without a numeric prefix yields None.
pub fn leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    let mut seen_digit = false;
    let mut seen_dot = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }

    if !seen_digit {
        return None;
    }

    // Optional exponent, only taken if it has digits
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}
