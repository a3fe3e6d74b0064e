//! Error types for diachi.
//!
//! Geocoding surfaces these errors to callers as typed failures. Autocomplete
//! and name resolution swallow them and degrade to empty results.

use thiserror::Error;

/// Result type alias using `GeoError`.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Main error type for all diachi operations.
#[derive(Debug, Error)]
pub enum GeoError {
    // ═══════════════════════════════════════════════════════════════════════════
    // CALLER ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A required parameter is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The provider answered but found nothing for the request.
    #[error("Not found: {0}")]
    NotFound(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A provider API key or setting is missing.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A provider returned a non-success status or an unusable body.
    #[error("Upstream failure from {provider}: {reason}")]
    UpstreamFailure {
        /// Provider that failed
        provider: &'static str,
        /// What went wrong
        reason: String,
    },

    /// HTTP transport failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The request exceeded its timeout.
    #[error("Request to {provider} timed out")]
    Timeout {
        /// Provider that timed out
        provider: &'static str,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GeoError {
    /// Shorthand for [`GeoError::UpstreamFailure`].
    pub fn upstream(provider: &'static str, reason: impl Into<String>) -> Self {
        GeoError::UpstreamFailure {
            provider,
            reason: reason.into(),
        }
    }

    /// Returns true if this error is worth retrying.
    ///
    /// Covers transport failures, timeouts, provider-side failures and
    /// malformed responses.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            GeoError::HttpError(_)
                | GeoError::Timeout { .. }
                | GeoError::UpstreamFailure { .. }
                | GeoError::JsonError(_)
        )
    }

    /// Returns true if the caller, not a provider, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, GeoError::InvalidInput(_) | GeoError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeoError::upstream("overpass", "HTTP 504");
        assert!(err.to_string().contains("overpass"));
        assert!(err.to_string().contains("504"));
    }

    #[test]
    fn test_error_classification() {
        assert!(GeoError::HttpError("reset".into()).is_recoverable());
        assert!(GeoError::Timeout { provider: "nominatim" }.is_recoverable());
        assert!(GeoError::upstream("overpass", "HTTP 429").is_recoverable());
        assert!(!GeoError::ConfigError("missing key".into()).is_recoverable());
        assert!(!GeoError::InvalidInput("empty".into()).is_recoverable());

        assert!(GeoError::NotFound("Hanoi".into()).is_client_error());
        assert!(!GeoError::HttpError("reset".into()).is_client_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_result: std::result::Result<serde_json::Value, _> = serde_json::from_str("<html>");
        let geo_result: Result<serde_json::Value> = json_result.map_err(GeoError::from);
        assert!(matches!(geo_result, Err(GeoError::JsonError(_))));
        assert!(geo_result.unwrap_err().is_recoverable());
    }
}
