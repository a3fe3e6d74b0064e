//! Vietmap autocomplete as an alternative street suggester.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};

use diachi_core::constants::{
    DEFAULT_TIMEOUT_SECONDS, DEFAULT_VIETMAP_AUTOCOMPLETE_URL, MAX_SUGGESTIONS, MIN_QUERY_CHARS,
};
use diachi_core::error::{GeoError, Result};
use diachi_core::traits::StreetSuggester;
use diachi_core::types::{AdminLevel, StreetQuery};

use crate::autocomplete::collect_suggestions;
use crate::http::{build_client, read_json, transport_error};
use crate::names::AdminNameResolver;

const PROVIDER: &str = "vietmap";

/// Vietmap configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct VietmapConfig {
    /// Autocomplete endpoint
    pub base_url: String,
    /// API key (`VIETMAP_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for VietmapConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VIETMAP_AUTOCOMPLETE_URL.into(),
            api_key: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl VietmapConfig {
    /// Creates config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    display: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl Item {
    fn label(self) -> Option<String> {
        [self.display, self.address, self.name]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// Street suggestions from Vietmap, filtered to the selected division.
pub struct VietmapSuggester {
    config: VietmapConfig,
    names: Arc<AdminNameResolver>,
    http_client: reqwest::Client,
}

impl VietmapSuggester {
    /// Creates a suggester resolving division names through `names`.
    pub fn with_config(config: VietmapConfig, names: Arc<AdminNameResolver>) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
            names,
        })
    }

    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn fetch(&self, query: &str, components: &str) -> Result<Vec<String>> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| GeoError::ConfigError("VIETMAP_API_KEY is not configured".into()))?;

        let response = self
            .http_client
            .get(&self.config.base_url)
            .query(&[("apikey", api_key), ("text", query), ("components", components)])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(GeoError::upstream(PROVIDER, format!("HTTP {}", response.status())));
        }

        let items: Vec<Item> = read_json(PROVIDER, response).await?;
        Ok(items.into_iter().filter_map(Item::label).collect())
    }
}

/// `country:VN`, narrowed to the district when known, else the province.
fn components_filter(district: Option<&str>, province: Option<&str>) -> String {
    match (district, province) {
        (Some(district), _) => format!("country:VN|administrative_area:{}", district),
        (None, Some(province)) => format!("country:VN|locality:{}", province),
        (None, None) => "country:VN".to_string(),
    }
}

#[async_trait]
impl StreetSuggester for VietmapSuggester {
    #[instrument(skip(self), fields(query = %request.query))]
    async fn suggest(&self, request: &StreetQuery) -> Vec<String> {
        let query = request.query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let (province, district) = tokio::join!(
            self.names.resolve(&request.province, AdminLevel::Province),
            self.names.resolve(&request.district, AdminLevel::District),
        );
        let components = components_filter(district.as_deref(), province.as_deref());
        debug!(components, "Vietmap filter");

        match self.fetch(query, &components).await {
            Ok(labels) => {
                let suggestions = collect_suggestions(labels, MAX_SUGGESTIONS);
                info!(count = suggestions.len(), "Returning Vietmap suggestions");
                suggestions
            }
            Err(e @ GeoError::ConfigError(_)) => {
                error!(error = %e, "Vietmap suggester unavailable");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "Vietmap autocomplete failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::names::tests::FakeDivisions;

    fn names() -> Arc<AdminNameResolver> {
        Arc::new(AdminNameResolver::new(Arc::new(
            FakeDivisions::default()
                .with(AdminLevel::Province, "01", "Thành phố Hà Nội")
                .with(AdminLevel::District, "002", "Quận Hoàn Kiếm"),
        )))
    }

    fn suggester(server: &MockServer) -> VietmapSuggester {
        VietmapSuggester::with_config(VietmapConfig::new(server.uri()).with_api_key("vm-key"), names())
            .unwrap()
    }

    #[test]
    fn test_components_filter_prefers_district() {
        assert_eq!(
            components_filter(Some("Quận Hoàn Kiếm"), Some("Thành phố Hà Nội")),
            "country:VN|administrative_area:Quận Hoàn Kiếm"
        );
        assert_eq!(
            components_filter(None, Some("Thành phố Hà Nội")),
            "country:VN|locality:Thành phố Hà Nội"
        );
        assert_eq!(components_filter(None, None), "country:VN");
    }

    #[tokio::test]
    async fn test_suggest_maps_labels() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("apikey", "vm-key"))
            .and(query_param("text", "Hàng B"))
            .and(query_param("components", "country:VN|administrative_area:Quận Hoàn Kiếm"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"display": "Hàng Bạc, Hoàn Kiếm, Hà Nội"},
                {"address": "Hàng Bè, Hoàn Kiếm, Hà Nội"},
                {"name": "Hàng Buồm"},
                {"display": "Hàng Bạc, Hoàn Kiếm, Hà Nội"},
                {"ref_id": "no label"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let request = StreetQuery::new("Hàng B").district("002").province("01");
        let suggestions = suggester(&server).suggest(&request).await;
        assert_eq!(
            suggestions,
            vec![
                "Hàng Bạc, Hoàn Kiếm, Hà Nội".to_string(),
                "Hàng Bè, Hoàn Kiếm, Hà Nội".to_string(),
                "Hàng Buồm".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_suggest_caps_results() {
        let server = MockServer::start().await;
        let items: Vec<_> = (0..15).map(|i| json!({"name": format!("Phố {}", i)})).collect();
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(items))
            .mount(&server)
            .await;

        let request = StreetQuery::new("Phố").province("01");
        assert_eq!(suggester(&server).suggest(&request).await.len(), 10);
    }

    #[tokio::test]
    async fn test_short_query_skips_provider() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let request = StreetQuery::new("H").province("01");
        assert!(suggester(&server).suggest(&request).await.is_empty());
    }

    #[tokio::test]
    async fn test_failures_degrade_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("text", "Hàng"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("text", "Phố"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("text", "Đường"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let suggester = suggester(&server);
        for query in ["Hàng", "Phố", "Đường"] {
            let request = StreetQuery::new(query).province("01");
            assert!(suggester.suggest(&request).await.is_empty(), "{}", query);
        }
    }

    #[tokio::test]
    async fn test_missing_key_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"name": "x"}])))
            .expect(0)
            .mount(&server)
            .await;

        let suggester = VietmapSuggester::with_config(VietmapConfig::new(server.uri()), names()).unwrap();
        assert!(!suggester.is_configured());
        assert!(suggester.suggest(&StreetQuery::new("Hàng")).await.is_empty());
    }
}
