//! Geographic types: coordinates, bounding boxes, geocoder diagnostics.

use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// COORDINATES
// ═══════════════════════════════════════════════════════════════════════════════

/// A point produced by the geocoder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl GeoCoordinates {
    /// Creates a new coordinate pair.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BOUNDING BOX
// ═══════════════════════════════════════════════════════════════════════════════

/// A rectangular region in south/west/north/east degree bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Southern latitude bound
    pub south: f64,
    /// Western longitude bound
    pub west: f64,
    /// Northern latitude bound
    pub north: f64,
    /// Eastern longitude bound
    pub east: f64,
}

impl BoundingBox {
    /// Creates a bounding box from its four bounds.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Builds a box from place-search order `[lat1, lat2, lon1, lon2]`.
    pub fn from_lat_lon_pairs(bounds: [f64; 4]) -> Self {
        let [lat1, lat2, lon1, lon2] = bounds;
        Self::new(lat1.min(lat2), lon1.min(lon2), lat1.max(lat2), lon1.max(lon2))
    }

    /// Latitude span in degrees.
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    /// Longitude span in degrees.
    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    /// Midpoint of the box.
    pub fn center(&self) -> GeoCoordinates {
        GeoCoordinates::new(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Shrinks each axis wider than `max_span` to exactly `max_span`,
    /// keeping that axis centred on its original midpoint.
    pub fn clamped(self, max_span: f64) -> Self {
        let (south, north) = clamp_axis(self.south, self.north, max_span);
        let (west, east) = clamp_axis(self.west, self.east, max_span);
        Self::new(south, west, north, east)
    }
}

fn clamp_axis(low: f64, high: f64, max_span: f64) -> (f64, f64) {
    if high - low <= max_span {
        return (low, high);
    }
    let mid = (low + high) / 2.0;
    let half = max_span / 2.0;
    (mid - half, mid + half)
}

// ═══════════════════════════════════════════════════════════════════════════════
// GEOCODER DIAGNOSTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Raw diagnostic payload from a one-off geocoder call.
///
/// A non-OK provider status is reported here rather than as a failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodeDiagnostic {
    /// Address that was sent
    pub query: String,
    /// Provider status code (e.g. "OK", "ZERO_RESULTS", "REQUEST_DENIED")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Latitude of the first result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude of the first result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
    /// Provider's formatted address for the first result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    /// Untouched provider response, kept when no coordinates were extracted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}
