//! Overpass map-data engine: named highways inside a bounding box.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use diachi_core::constants::{DEFAULT_OVERPASS_URL, DEFAULT_TIMEOUT_SECONDS, OVERPASS_QUERY_TIMEOUT_SECONDS};
use diachi_core::error::{GeoError, Result};
use diachi_core::traits::StreetIndex;
use diachi_core::types::BoundingBox;

use crate::http::{build_client, read_json, transport_error};

const PROVIDER: &str = "overpass";

/// Overpass configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OverpassConfig {
    /// Interpreter endpoint, e.g. `https://overpass-api.de/api/interpreter`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OVERPASS_URL.into(),
            // Leave room for the server-side query timeout
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS.max(OVERPASS_QUERY_TIMEOUT_SECONDS + 5),
        }
    }
}

impl OverpassConfig {
    /// Creates config pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Overpass interpreter client.
pub struct OverpassClient {
    config: OverpassConfig,
    http_client: reqwest::Client,
}

impl OverpassClient {
    /// Creates a client with custom configuration.
    pub fn with_config(config: OverpassConfig) -> Result<Self> {
        Ok(Self {
            http_client: build_client(config.timeout_seconds)?,
            config,
        })
    }
}

/// Builds the Overpass QL query for highways named like `pattern` in `bbox`.
///
/// The match is a case-insensitive regex; regex metacharacters in `pattern`
/// are escaped so it behaves as a substring match.
pub fn build_street_query(bbox: &BoundingBox, pattern: &str) -> String {
    format!(
        "[out:json][timeout:{}];\nway[\"highway\"][\"name\"~\"{}\",i]({},{},{},{});\nout tags;",
        OVERPASS_QUERY_TIMEOUT_SECONDS,
        escape_pattern(pattern),
        bbox.south,
        bbox.west,
        bbox.north,
        bbox.east,
    )
}

fn escape_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' | '.' | '^' | '$' | '|' | '?' | '*' | '+' | '(' | ')' | '[' | ']' | '{' | '}' => {
                out.push_str("\\\\");
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Vec<Element>,
}

#[derive(Debug, Deserialize)]
struct Element {
    #[serde(default)]
    tags: Option<Tags>,
}

#[derive(Debug, Deserialize)]
struct Tags {
    #[serde(default)]
    name: Option<String>,
}

#[async_trait]
impl StreetIndex for OverpassClient {
    #[instrument(skip(self))]
    async fn street_names(&self, bbox: &BoundingBox, pattern: &str) -> Result<Vec<String>> {
        let query = build_street_query(bbox, pattern);
        debug!(query, "Overpass query");

        let response = self
            .http_client
            .post(&self.config.base_url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(GeoError::upstream(PROVIDER, format!("HTTP {}", response.status())));
        }

        let body: OverpassResponse = read_json(PROVIDER, response).await?;
        Ok(body
            .elements
            .into_iter()
            .filter_map(|e| e.tags.and_then(|t| t.name))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn hoan_kiem() -> BoundingBox {
        BoundingBox::new(21.0145, 105.8425, 21.0411, 105.8637)
    }

    #[test]
    fn test_build_street_query() {
        let query = build_street_query(&hoan_kiem(), "Hàng B");
        assert!(query.starts_with("[out:json][timeout:25];"));
        assert!(query.contains("way[\"highway\"][\"name\"~\"Hàng B\",i](21.0145,105.8425,21.0411,105.8637);"));
        assert!(query.ends_with("out tags;"));
    }

    #[test]
    fn test_escape_pattern() {
        assert_eq!(escape_pattern("a.b"), "a\\\\.b");
        assert_eq!(escape_pattern("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_pattern("Lý Thái Tổ"), "Lý Thái Tổ");
    }

    #[tokio::test]
    async fn test_street_names_from_tags() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("data="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "elements": [
                    {"type": "way", "id": 1, "tags": {"highway": "tertiary", "name": "Hàng Bạc"}},
                    {"type": "way", "id": 2, "tags": {"highway": "residential"}},
                    {"type": "way", "id": 3, "tags": {"highway": "tertiary", "name": "Hàng Bạc"}},
                    {"type": "way", "id": 4}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OverpassClient::with_config(OverpassConfig::new(server.uri())).unwrap();
        let names = client.street_names(&hoan_kiem(), "Hàng").await.unwrap();
        assert_eq!(names, vec!["Hàng Bạc".to_string(), "Hàng Bạc".to_string()]);
    }

    #[tokio::test]
    async fn test_rate_limited_is_recoverable_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = OverpassClient::with_config(OverpassConfig::new(server.uri())).unwrap();
        let err = client.street_names(&hoan_kiem(), "Hàng").await.unwrap_err();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn test_malformed_body_is_recoverable_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>busy</html>"))
            .mount(&server)
            .await;

        let client = OverpassClient::with_config(OverpassConfig::new(server.uri())).unwrap();
        let err = client.street_names(&hoan_kiem(), "Hàng").await.unwrap_err();
        assert!(matches!(err, GeoError::JsonError(_)));
        assert!(err.is_recoverable());
    }
}
