//! Service constants for diachi.
//!
//! Provider endpoints are defaults only; every client accepts an override so
//! tests and self-hosted mirrors can point elsewhere.

use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM PROVIDERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Vietnamese administrative-division API (provinces, districts, wards).
pub const DEFAULT_PROVINCES_API_URL: &str = "https://provinces.open-api.vn/api/v1";

/// DistanceMatrix.ai geocoding endpoint.
pub const DEFAULT_GEOCODE_API_URL: &str = "https://api.distancematrix.ai/maps/api/geocode/json";

/// Nominatim place search, used to derive a bounding box from a locality.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

/// Overpass map-data query engine.
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Vietmap autocomplete endpoint.
pub const DEFAULT_VIETMAP_AUTOCOMPLETE_URL: &str = "https://maps.vietmap.vn/api/autocomplete/v3";

/// User agent sent to every provider. Nominatim rejects anonymous clients.
pub const USER_AGENT: &str = concat!("diachi/", env!("CARGO_PKG_VERSION"));

/// Default per-request timeout for upstream calls, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Country suffix appended to every locality string.
pub const COUNTRY_NAME: &str = "Vietnam";

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE LIFETIMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Division names rarely change.
pub const ADMIN_NAME_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Street results follow map-data edits and must not go stale for long.
pub const STREET_SUGGESTION_TTL: Duration = Duration::from_secs(5 * 60);

// ═══════════════════════════════════════════════════════════════════════════════
// AUTOCOMPLETE
// ═══════════════════════════════════════════════════════════════════════════════

/// Queries shorter than this (in characters) are answered with no results.
pub const MIN_QUERY_CHARS: usize = 2;

/// Maximum number of street suggestions returned.
pub const MAX_SUGGESTIONS: usize = 10;

/// Server-side debounce window per `(district, province)` pair.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(400);

/// Total attempts against the map-data engine, including the first.
pub const MAP_QUERY_MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles on each subsequent retry.
pub const MAP_QUERY_BASE_DELAY: Duration = Duration::from_secs(1);

/// Maximum span of a search bounding box on either axis, in degrees.
pub const MAX_BBOX_SPAN_DEGREES: f64 = 0.5;

/// Server-side timeout written into each map-data query, in seconds.
pub const OVERPASS_QUERY_TIMEOUT_SECONDS: u64 = 25;
