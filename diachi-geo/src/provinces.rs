//! Administrative-division provider client.
//!
//! Serves two callers: the passthrough routes, which forward the provider's
//! JSON untouched, and the name resolver, which needs one name per code.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument};

use diachi_core::constants::{DEFAULT_PROVINCES_API_URL, DEFAULT_TIMEOUT_SECONDS};
use diachi_core::error::{GeoError, Result};
use diachi_core::traits::DivisionSource;
use diachi_core::types::{AdminLevel, AdminUnit};

use crate::http::{base, build_client, read_json, transport_error};

const PROVIDER: &str = "provinces";

/// Division provider configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ProvincesConfig {
    /// API root, e.g. `https://provinces.open-api.vn/api/v1`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for ProvincesConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVINCES_API_URL.into(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl ProvincesConfig {
    /// Creates config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Client for the Vietnamese administrative-division API.
pub struct ProvincesClient {
    config: ProvincesConfig,
    http_client: reqwest::Client,
}

impl ProvincesClient {
    /// Creates a client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ProvincesConfig::default())
    }

    /// Creates a client with custom configuration.
    pub fn with_config(config: ProvincesConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
        })
    }

    /// Lists every province. `depth = 2` embeds districts.
    #[instrument(skip(self))]
    pub async fn list_provinces(&self, depth: u8) -> Result<Value> {
        let url = format!("{}/", base(&self.config.base_url));
        self.fetch_json(&url, depth).await
    }

    /// Fetches one province. `depth = 2` embeds its districts.
    #[instrument(skip(self))]
    pub async fn province(&self, code: &str, depth: u8) -> Result<Value> {
        validate_code(code)?;
        let url = self.division_url(AdminLevel::Province, code);
        self.fetch_json(&url, depth).await
    }

    /// Fetches one district. `depth = 2` embeds its wards.
    #[instrument(skip(self))]
    pub async fn district(&self, code: &str, depth: u8) -> Result<Value> {
        validate_code(code)?;
        let url = self.division_url(AdminLevel::District, code);
        self.fetch_json(&url, depth).await
    }

    fn division_url(&self, level: AdminLevel, code: &str) -> String {
        format!(
            "{}/{}/{}",
            base(&self.config.base_url),
            level.path_segment(),
            code
        )
    }

    async fn fetch_json(&self, url: &str, depth: u8) -> Result<Value> {
        let response = self
            .http_client
            .get(url)
            .query(&[("depth", depth)])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(GeoError::upstream(
                PROVIDER,
                format!("HTTP {} for {}", response.status(), url),
            ));
        }

        read_json(PROVIDER, response).await
    }
}

#[derive(Debug, Deserialize)]
struct DivisionRecord {
    #[serde(default)]
    name: Option<String>,
}

#[async_trait]
impl DivisionSource for ProvincesClient {
    #[instrument(skip(self))]
    async fn lookup(&self, level: AdminLevel, code: &str) -> Result<Option<AdminUnit>> {
        if validate_code(code).is_err() {
            return Ok(None);
        }

        let url = self.division_url(level, code);
        let response = self
            .http_client
            .get(&url)
            .query(&[("depth", 1u8)])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            debug!(%level, code, status = %response.status(), "Division lookup returned non-success");
            return Ok(None);
        }

        let record: DivisionRecord = read_json(PROVIDER, response).await?;
        Ok(record
            .name
            .filter(|n| !n.trim().is_empty())
            .map(|name| AdminUnit::new(code, name, level)))
    }
}

/// Division codes are short alphanumeric identifiers.
fn validate_code(code: &str) -> Result<()> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(GeoError::InvalidInput(format!(
            "Invalid division code: {:?}",
            code
        )));
    }
    Ok(())
}
