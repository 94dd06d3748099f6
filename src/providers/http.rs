//! Shared HTTP plumbing for adapters

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use crate::config::HttpConfig;
use crate::error::ProviderError;

/// Build the client every adapter shares
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .context("Failed to build HTTP client")
}

/// Send a request and decode a JSON body.
///
/// Returns Ok(None) on 404 so callers can pick the right not-found error.
/// Transport failures and other non-success statuses are
/// `ProviderUnavailable`; undecodable bodies are `Parse`.
pub async fn send_json<T: DeserializeOwned>(
    provider: &'static str,
    request: RequestBuilder,
) -> std::result::Result<Option<T>, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::unavailable(provider, e))?;

    let status = response.status();
    debug!("{} responded with {}", provider, status);

    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(ProviderError::unavailable(
            provider,
            format!("returned status {}", status),
        ));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ProviderError::unavailable(provider, e))?;

    serde_json::from_str(&body)
        .map(Some)
        .map_err(|e| ProviderError::parse(provider, e))
}

/// Parse an RFC 3339 timestamp into unix seconds
pub fn parse_timestamp(
    provider: &'static str,
    value: &str,
) -> std::result::Result<i64, ProviderError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.timestamp())
        .map_err(|e| ProviderError::parse(provider, format!("bad timestamp '{}': {}", value, e)))
}
