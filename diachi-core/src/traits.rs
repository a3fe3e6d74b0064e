//! Common traits for diachi.
//!
//! These traits separate the orchestration logic from the upstream providers,
//! so tests can swap in counting fakes and deployments can swap providers.
//!
//! Two error contracts live here side by side and must stay distinct:
//! [`Geocoder`] fails loudly with a typed [`GeoError`](crate::GeoError), while
//! [`StreetSuggester`] is best-effort and never fails.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AdminLevel, AdminUnit, BoundingBox, GeoCoordinates, StreetQuery};

// ═══════════════════════════════════════════════════════════════════════════════
// ADMINISTRATIVE DIVISIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of administrative division records.
#[async_trait]
pub trait DivisionSource: Send + Sync {
    /// Fetches one division at depth 1.
    ///
    /// Returns `Ok(None)` when the provider answers with a non-success status.
    async fn lookup(&self, level: AdminLevel, code: &str) -> Result<Option<AdminUnit>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// GEOCODING
// ═══════════════════════════════════════════════════════════════════════════════

/// Address to coordinates, with typed failures.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Geocodes a free-form address.
    ///
    /// # Errors
    /// - `InvalidInput` for an empty address
    /// - `ConfigError` when the provider key is missing
    /// - `NotFound` when the provider has no result
    /// - transport and upstream errors otherwise
    async fn geocode(&self, address: &str) -> Result<GeoCoordinates>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// STREET SEARCH
// ═══════════════════════════════════════════════════════════════════════════════

/// Geographic name search: locality string to bounding box.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    /// Returns the bounding box of the best match, if any.
    async fn bounding_box(&self, locality: &str) -> Result<Option<BoundingBox>>;
}

/// Map-data tag query engine.
#[async_trait]
pub trait StreetIndex: Send + Sync {
    /// Returns the `name` tag of every highway inside `bbox` whose name
    /// matches `pattern` case-insensitively. May contain duplicates.
    async fn street_names(&self, bbox: &BoundingBox, pattern: &str) -> Result<Vec<String>>;
}

/// Best-effort street autocomplete.
///
/// Implementations never fail: any upstream problem yields an empty list.
/// Results are deduplicated and capped at
/// [`MAX_SUGGESTIONS`](crate::constants::MAX_SUGGESTIONS).
#[async_trait]
pub trait StreetSuggester: Send + Sync {
    /// Returns street suggestions for the request, possibly empty.
    async fn suggest(&self, request: &StreetQuery) -> Vec<String>;
}
