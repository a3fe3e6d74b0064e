//! App state: provider clients, street suggester, config.

use std::sync::Arc;

use tracing::info;

use diachi_core::constants::{
    DEFAULT_GEOCODE_API_URL, DEFAULT_NOMINATIM_URL, DEFAULT_OVERPASS_URL, DEFAULT_PROVINCES_API_URL,
    DEFAULT_VIETMAP_AUTOCOMPLETE_URL,
};
use diachi_core::error::Result;
use diachi_core::traits::StreetSuggester;
use diachi_geo::{
    AdminNameResolver, GeocodeClient, GeocodeConfig, NominatimClient, NominatimConfig, OverpassClient,
    OverpassConfig, ProvincesClient, ProvincesConfig, StreetAutocomplete, VietmapConfig, VietmapSuggester,
};

const DEFAULT_PORT: u16 = 5000;

/// Backend answering street autocomplete.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreetSource {
    /// Place search + map-data engine pipeline
    #[default]
    Overpass,
    /// Vietmap autocomplete API
    Vietmap,
}

impl StreetSource {
    /// Parses `overpass` / `vietmap`, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "overpass" => Some(Self::Overpass),
            "vietmap" => Some(Self::Vietmap),
            _ => None,
        }
    }
}

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Listening port
    pub port: u16,
    /// Environment name; `production` masks error details
    pub environment: String,
    /// Geocoding provider key
    pub distancematrix_api_key: Option<String>,
    /// Vietmap autocomplete key
    pub vietmap_api_key: Option<String>,
    /// Street autocomplete backend
    pub street_source: StreetSource,
    /// Division provider root
    pub provinces_api_url: String,
    /// Geocoding endpoint
    pub geocode_api_url: String,
    /// Place search root
    pub nominatim_url: String,
    /// Map-data interpreter endpoint
    pub overpass_url: String,
    /// Vietmap autocomplete endpoint
    pub vietmap_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".into(),
            distancematrix_api_key: None,
            vietmap_api_key: None,
            street_source: StreetSource::default(),
            provinces_api_url: DEFAULT_PROVINCES_API_URL.into(),
            geocode_api_url: DEFAULT_GEOCODE_API_URL.into(),
            nominatim_url: DEFAULT_NOMINATIM_URL.into(),
            overpass_url: DEFAULT_OVERPASS_URL.into(),
            vietmap_url: DEFAULT_VIETMAP_AUTOCOMPLETE_URL.into(),
        }
    }
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.into())
}

impl ApiConfig {
    /// Loads configuration from the environment, reading `.env` first.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            port: env_opt("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            environment: env_or("APP_ENV", "development"),
            distancematrix_api_key: env_opt("DISTANCEMATRIX_API_KEY"),
            vietmap_api_key: env_opt("VIETMAP_API_KEY"),
            street_source: env_opt("STREET_SOURCE")
                .and_then(|s| StreetSource::parse(&s))
                .unwrap_or_default(),
            provinces_api_url: env_or("PROVINCES_API_URL", DEFAULT_PROVINCES_API_URL),
            geocode_api_url: env_or("GEOCODE_API_URL", DEFAULT_GEOCODE_API_URL),
            nominatim_url: env_or("NOMINATIM_URL", DEFAULT_NOMINATIM_URL),
            overpass_url: env_or("OVERPASS_URL", DEFAULT_OVERPASS_URL),
            vietmap_url: env_or("VIETMAP_URL", DEFAULT_VIETMAP_AUTOCOMPLETE_URL),
        }
    }

    /// Whether this is a production deployment.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Provider keys the current setup needs but lacks.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.distancematrix_api_key.is_none() {
            missing.push("DISTANCEMATRIX_API_KEY");
        }
        if self.street_source == StreetSource::Vietmap && self.vietmap_api_key.is_none() {
            missing.push("VIETMAP_API_KEY");
        }
        missing
    }
}

/// Shared handler state.
pub struct AppState {
    /// Server configuration
    pub config: ApiConfig,
    /// Division provider, for the passthrough routes
    pub provinces: Arc<ProvincesClient>,
    /// Geocoding provider
    pub geocoder: GeocodeClient,
    /// Street autocomplete backend
    pub suggester: Arc<dyn StreetSuggester>,
}

impl AppState {
    /// Wires every provider client from `config`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let provinces = provinces_client(&config)?;
        let names = Arc::new(AdminNameResolver::new(provinces.clone()));

        let suggester: Arc<dyn StreetSuggester> = match config.street_source {
            StreetSource::Overpass => Arc::new(StreetAutocomplete::new(
                names,
                Arc::new(NominatimClient::with_config(NominatimConfig::new(&config.nominatim_url))?),
                Arc::new(OverpassClient::with_config(OverpassConfig::new(&config.overpass_url))?),
            )),
            StreetSource::Vietmap => {
                let mut vietmap = VietmapConfig::new(&config.vietmap_url);
                vietmap.api_key = config.vietmap_api_key.clone();
                Arc::new(VietmapSuggester::with_config(vietmap, names)?)
            }
        };
        info!(source = ?config.street_source, "Street suggestions configured");

        Self::assemble(config, provinces, suggester)
    }

    /// Wires the provider clients but uses `suggester` for autocomplete.
    pub fn with_suggester(config: ApiConfig, suggester: Arc<dyn StreetSuggester>) -> Result<Self> {
        let provinces = provinces_client(&config)?;
        Self::assemble(config, provinces, suggester)
    }

    fn assemble(
        config: ApiConfig,
        provinces: Arc<ProvincesClient>,
        suggester: Arc<dyn StreetSuggester>,
    ) -> Result<Self> {
        let mut geocode = GeocodeConfig::new(&config.geocode_api_url);
        geocode.api_key = config.distancematrix_api_key.clone();
        let geocoder = GeocodeClient::with_config(geocode)?;

        Ok(Self {
            config,
            provinces,
            geocoder,
            suggester,
        })
    }
}

fn provinces_client(config: &ApiConfig) -> Result<Arc<ProvincesClient>> {
    ProvincesClient::with_config(ProvincesConfig::new(&config.provinces_api_url)).map(Arc::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_street_source_parse() {
        assert_eq!(StreetSource::parse("overpass"), Some(StreetSource::Overpass));
        assert_eq!(StreetSource::parse(" Vietmap "), Some(StreetSource::Vietmap));
        assert_eq!(StreetSource::parse("google"), None);
    }

    #[test]
    fn test_missing_keys_depend_on_source() {
        let mut config = ApiConfig::default();
        assert_eq!(config.missing_keys(), vec!["DISTANCEMATRIX_API_KEY"]);

        config.street_source = StreetSource::Vietmap;
        assert_eq!(config.missing_keys(), vec!["DISTANCEMATRIX_API_KEY", "VIETMAP_API_KEY"]);

        config.distancematrix_api_key = Some("dm".into());
        config.vietmap_api_key = Some("vm".into());
        assert!(config.missing_keys().is_empty());
    }

    #[test]
    fn test_production_flag() {
        let mut config = ApiConfig::default();
        assert!(!config.is_production());
        config.environment = "PRODUCTION".into();
        assert!(config.is_production());
    }

    #[test]
    fn test_state_builds_for_both_sources() {
        let mut config = ApiConfig::default();
        assert!(AppState::new(config.clone()).is_ok());
        config.street_source = StreetSource::Vietmap;
        assert!(AppState::new(config).is_ok());
    }
}
