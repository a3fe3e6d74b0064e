//! Nominatim place search: locality string → bounding box.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use diachi_core::constants::{DEFAULT_NOMINATIM_URL, DEFAULT_TIMEOUT_SECONDS};
use diachi_core::error::{GeoError, Result};
use diachi_core::traits::PlaceSearch;
use diachi_core::types::BoundingBox;

use crate::http::{base, build_client, read_json, transport_error};

const PROVIDER: &str = "nominatim";

/// Nominatim configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NominatimConfig {
    /// Server root, e.g. `https://nominatim.openstreetmap.org`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NOMINATIM_URL.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl NominatimConfig {
    /// Creates config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Nominatim search client.
pub struct NominatimClient {
    config: NominatimConfig,
    http_client: reqwest::Client,
}

impl NominatimClient {
    /// Creates a client with custom configuration.
    pub fn with_config(config: NominatimConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    /// `[lat1, lat2, lon1, lon2]` as decimal strings
    #[serde(default)]
    boundingbox: Option<Vec<String>>,
}

#[async_trait]
impl PlaceSearch for NominatimClient {
    #[instrument(skip(self))]
    async fn bounding_box(&self, locality: &str) -> Result<Option<BoundingBox>> {
        let url = format!("{}/search", base(&self.config.base_url));
        let response = self
            .http_client
            .get(&url)
            .query(&[("q", locality), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(GeoError::upstream(PROVIDER, format!("HTTP {}", response.status())));
        }

        let places: Vec<Place> = read_json(PROVIDER, response).await?;
        let Some(raw) = places.into_iter().next().and_then(|p| p.boundingbox) else {
            debug!(locality, "No place or bounding box found");
            return Ok(None);
        };

        parse_bounds(&raw).map(Some)
    }
}

fn parse_bounds(raw: &[String]) -> Result<BoundingBox> {
    if raw.len() != 4 {
        return Err(GeoError::upstream(
            PROVIDER,
            format!("bounding box has {} values, expected 4", raw.len()),
        ));
    }

    let mut bounds = [0f64; 4];
    for (slot, value) in bounds.iter_mut().zip(raw) {
        *slot = value
            .trim()
            .parse()
            .map_err(|_| GeoError::upstream(PROVIDER, format!("invalid coordinate {:?}", value)))?;
    }
    Ok(BoundingBox::from_lat_lon_pairs(bounds))
}
