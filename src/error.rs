//! Error taxonomy for provider dispatch and fetches

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("No provider supports '{0}'")]
    NoSupportingAdapter(String),

    #[error("'{url}' is claimed by multiple providers: {}", .providers.join(", "))]
    AmbiguousUrl {
        url: String,
        providers: Vec<&'static str>,
    },

    #[error("{provider} is unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("Failed to parse {provider} response: {reason}")]
    Parse {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider} does not recognize a series in '{url}'")]
    UnrecognizedSeriesUrl { provider: &'static str, url: String },

    #[error("Series '{series_id}' not found at {provider}")]
    SeriesNotFound {
        provider: &'static str,
        series_id: String,
    },

    #[error("Chapter '{chapter_id}' not found in series '{series_id}'")]
    ChapterNotFound {
        series_id: String,
        chapter_id: String,
    },

    #[error("{provider} does not support reading chapters")]
    ReadingUnsupported { provider: &'static str },
}

impl ProviderError {
    /// Transient upstream failures are worth another attempt; malformed
    /// content and dispatch errors are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::ProviderUnavailable { .. })
    }

    pub(crate) fn unavailable(provider: &'static str, err: impl std::fmt::Display) -> Self {
        ProviderError::ProviderUnavailable {
            provider,
            reason: err.to_string(),
        }
    }

    pub(crate) fn parse(provider: &'static str, err: impl std::fmt::Display) -> Self {
        ProviderError::Parse {
            provider,
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
