//! Geocoding provider client (DistanceMatrix.ai).
//!
//! The provider nests results under either `results` or `result`; both are
//! accepted.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use diachi_core::constants::{DEFAULT_GEOCODE_API_URL, DEFAULT_TIMEOUT_SECONDS};
use diachi_core::error::{GeoError, Result};
use diachi_core::traits::Geocoder;
use diachi_core::types::{GeoCoordinates, GeocodeDiagnostic};

use crate::http::{build_client, read_json, transport_error};

const PROVIDER: &str = "geocode";
const STATUS_OK: &str = "OK";

/// Geocoder configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GeocodeConfig {
    /// Full endpoint URL
    pub base_url: String,
    /// Provider API key. Geocoding fails with `ConfigError` while unset.
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODE_API_URL.into(),
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl GeocodeConfig {
    /// Creates config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the provider API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

/// Geocoding client.
pub struct GeocodeClient {
    config: GeocodeConfig,
    http_client: reqwest::Client,
}

impl GeocodeClient {
    /// Creates a client with custom configuration.
    pub fn with_config(config: GeocodeConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
        })
    }

    /// Returns true if an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    /// Probes the provider and returns its raw diagnostic payload.
    ///
    /// Unlike [`Geocoder::geocode`], a non-OK provider status is returned as
    /// data. Only a missing key or a transport failure is an error.
    #[instrument(skip(self))]
    pub async fn test_geocode(&self, address: &str) -> Result<GeocodeDiagnostic> {
        let raw = self.fetch(address).await?;
        let status = response_status(&raw).map(str::to_string);

        let mut diagnostic = GeocodeDiagnostic {
            query: address.to_string(),
            status: status.clone(),
            ..Default::default()
        };

        if status.as_deref() != Some(STATUS_OK) {
            diagnostic.raw = Some(raw);
            return Ok(diagnostic);
        }

        match first_result(raw.clone())? {
            Some(first) => {
                diagnostic.lat = Some(first.geometry.location.lat);
                diagnostic.lng = Some(first.geometry.location.lng);
                diagnostic.formatted = first.formatted_address;
            }
            None => diagnostic.raw = Some(raw),
        }
        Ok(diagnostic)
    }

    fn api_key(&self) -> Result<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| GeoError::ConfigError("DISTANCEMATRIX_API_KEY is not configured".into()))
    }

    async fn fetch(&self, address: &str) -> Result<Value> {
        let key = self.api_key()?;

        let response = self
            .http_client
            .get(&self.config.base_url)
            .query(&[("address", address), ("key", key)])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(GeoError::upstream(PROVIDER, format!("HTTP {}", status)));
        }

        read_json(PROVIDER, response).await
    }
}

#[async_trait]
impl Geocoder for GeocodeClient {
    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<GeoCoordinates> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeoError::InvalidInput("Address is required".into()));
        }

        let raw = self.fetch(address).await?;
        debug!(response = %raw, "Geocode response");

        let status = response_status(&raw).unwrap_or_default().to_string();
        let first = if status == STATUS_OK {
            first_result(raw)?
        } else {
            None
        };

        match first {
            Some(result) => {
                let coords = GeoCoordinates::new(result.geometry.location.lat, result.geometry.location.lng);
                info!(lat = coords.lat, lng = coords.lng, "Geocoded address");
                Ok(coords)
            }
            None => {
                warn!(address, status = %status, "No coordinates found");
                Err(GeoError::NotFound(format!("Coordinates not found for '{}'", address)))
            }
        }
    }
}

/// Provider status, read before any typed parsing so that non-OK bodies of
/// any shape stay diagnosable.
fn response_status(raw: &Value) -> Option<&str> {
    raw.get("status").and_then(Value::as_str)
}

/// First result of an OK response. Accepts `results` or `result`.
fn first_result(raw: Value) -> Result<Option<GeocodeResult>> {
    let parsed: GeocodeResponse = serde_json::from_value(raw)?;
    Ok(parsed.into_results().into_iter().next())
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Option<Vec<GeocodeResult>>,
    #[serde(default)]
    result: Option<Vec<GeocodeResult>>,
}

impl GeocodeResponse {
    fn into_results(self) -> Vec<GeocodeResult> {
        match (self.results, self.result) {
            (Some(results), _) if !results.is_empty() => results,
            (_, Some(result)) => result,
            (Some(results), None) => results,
            (None, None) => Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
    #[serde(default)]
    formatted_address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}
