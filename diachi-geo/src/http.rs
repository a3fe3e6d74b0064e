//! Shared reqwest plumbing for the upstream clients.

use std::time::Duration;

use diachi_core::constants::USER_AGENT;
use diachi_core::error::{GeoError, Result};

/// Builds an HTTP client with the service user agent and a request timeout.
pub(crate) fn build_client(timeout_seconds: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| GeoError::ConfigError(format!("Failed to create HTTP client: {}", e)))
}

/// Classifies a reqwest failure for `provider`.
pub(crate) fn transport_error(provider: &'static str, err: reqwest::Error) -> GeoError {
    if err.is_timeout() {
        GeoError::Timeout { provider }
    } else {
        GeoError::HttpError(format!("{}: {}", provider, err))
    }
}

/// Reads a response body as JSON, reporting undecodable bodies as upstream
/// failures of `provider`.
pub(crate) async fn read_json<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T> {
    let text = response
        .text()
        .await
        .map_err(|e| transport_error(provider, e))?;
    if text.trim().is_empty() {
        return Err(GeoError::upstream(provider, "empty response body"));
    }
    serde_json::from_str(&text).map_err(GeoError::from)
}

/// Trims a configured base URL so paths can be appended with `/`.
pub(crate) fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}
