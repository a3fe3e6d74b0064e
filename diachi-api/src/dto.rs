//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

use diachi_core::types::StreetQuery;

/// `?depth=` on the division routes.
///
/// Kept as a string so a malformed value falls back to the route default
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct DepthQuery {
    /// Requested nesting depth
    pub depth: Option<String>,
}

impl DepthQuery {
    /// The requested depth, or `default` when absent, zero or unparsable.
    pub fn depth_or(&self, default: u8) -> u8 {
        self.depth
            .as_deref()
            .and_then(|d| d.trim().parse::<u8>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(default)
    }
}

/// `?address=` on the geocoding routes.
#[derive(Debug, Default, Deserialize)]
pub struct AddressQuery {
    /// Free-form address
    pub address: Option<String>,
}

/// Query string of the street autocomplete route.
#[derive(Debug, Default, Deserialize)]
pub struct AutocompleteQuery {
    /// Typed text
    #[serde(default)]
    pub q: String,
    /// Ward code
    #[serde(default)]
    pub ward: String,
    /// District code
    #[serde(default)]
    pub district: String,
    /// Province code
    #[serde(default)]
    pub province: String,
}

impl From<AutocompleteQuery> for StreetQuery {
    fn from(query: AutocompleteQuery) -> Self {
        StreetQuery::new(query.q)
            .ward(query.ward)
            .district(query.district)
            .province(query.province)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always true
    pub success: bool,
    /// Human-readable status
    pub message: String,
    /// ISO-8601 server time
    pub timestamp: String,
}
