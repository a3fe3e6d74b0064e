//! Street autocomplete orchestration.
//!
//! A search runs through these stages:
//! 1. Gate: queries under two characters return nothing
//! 2. Sanitize: keep ASCII letters/digits, Vietnamese letters, whitespace
//! 3. Cache lookup on `(query, district, province)`; a hit skips everything below
//! 4. Debounce on `(district, province)`; superseded callers get `[]`
//! 5. Resolve ward/district/province names concurrently; no province, no search
//! 6. Place search on the locality string, bounding box clamped to 0.5°
//! 7. Map-data query with exponential-backoff retry
//! 8. Deduplicate, cap at 10, cache
//!
//! Every failure in stages 5 to 7 yields an empty list and nothing is cached.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};
use unicode_normalization::UnicodeNormalization;

use diachi_cache::TtlCache;
use diachi_core::constants::{
    COUNTRY_NAME, DEBOUNCE_DELAY, MAX_BBOX_SPAN_DEGREES, MAX_SUGGESTIONS, MIN_QUERY_CHARS,
    STREET_SUGGESTION_TTL,
};
use diachi_core::traits::{PlaceSearch, StreetIndex, StreetSuggester};
use diachi_core::types::{AdminLevel, StreetQuery};

use crate::debounce::{Debounced, Debouncer};
use crate::names::AdminNameResolver;
use crate::retry::RetryPolicy;

/// Vietnamese letters outside ASCII, both cases.
const VIETNAMESE_LETTERS: &str = "àáạảãâầấậẩẫăằắặẳẵèéẹẻẽêềếệểễìíịỉĩòóọỏõôồốộổỗơờớợởỡùúụủũưừứựửữỳýỵỷỹđ\
ÀÁẠẢÃÂẦẤẬẨẪĂẰẮẶẲẴÈÉẸẺẼÊỀẾỆỂỄÌÍỊỈĨÒÓỌỎÕÔỒỐỘỔỖƠỜỚỢỞỠÙÚỤỦŨƯỪỨỰỬỮỲÝỴỶỸĐ";

/// Normalizes to NFC, strips everything but ASCII letters and digits,
/// Vietnamese letters and whitespace, then trims.
pub fn sanitize_query(raw: &str) -> String {
    raw.nfc()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace() || VIETNAMESE_LETTERS.contains(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

fn suggestion_key(query: &str, district: &str, province: &str) -> String {
    format!("{}|{}|{}", query, district, province)
}

fn debounce_key(district: &str, province: &str) -> String {
    format!("{}|{}", district, province)
}

/// Joins the non-empty parts with `", "`, ending in the country name.
fn locality_string(ward: Option<&str>, district: Option<&str>, province: &str) -> String {
    [ward, district, Some(province), Some(COUNTRY_NAME)]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// First-seen-order dedup by exact string equality, capped at `limit`.
pub(crate) fn collect_suggestions(names: Vec<String>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .into_iter()
        .filter(|name| !name.trim().is_empty())
        .filter(|name| seen.insert(name.clone()))
        .take(limit)
        .collect()
}

/// Orchestrator tuning.
#[derive(Clone, Debug)]
pub struct AutocompleteConfig {
    /// Per-`(district, province)` debounce window
    pub debounce_delay: Duration,
    /// Lifetime of cached suggestion lists
    pub suggestion_ttl: Duration,
    /// Map-data retry schedule
    pub retry: RetryPolicy,
    /// Maximum bounding-box span per axis, in degrees
    pub max_span_degrees: f64,
    /// Maximum suggestions returned
    pub max_suggestions: usize,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce_delay: DEBOUNCE_DELAY,
            suggestion_ttl: STREET_SUGGESTION_TTL,
            retry: RetryPolicy::default(),
            max_span_degrees: MAX_BBOX_SPAN_DEGREES,
            max_suggestions: MAX_SUGGESTIONS,
        }
    }
}

/// Street autocomplete backed by a place search and a map-data engine.
///
/// Owns its suggestion cache and debounce slots; separate instances share
/// nothing.
pub struct StreetAutocomplete {
    names: Arc<AdminNameResolver>,
    places: Arc<dyn PlaceSearch>,
    streets: Arc<dyn StreetIndex>,
    cache: TtlCache<Vec<String>>,
    debouncer: Debouncer,
    config: AutocompleteConfig,
}

impl StreetAutocomplete {
    /// Creates an orchestrator with default tuning.
    pub fn new(
        names: Arc<AdminNameResolver>,
        places: Arc<dyn PlaceSearch>,
        streets: Arc<dyn StreetIndex>,
    ) -> Self {
        Self::with_config(names, places, streets, AutocompleteConfig::default())
    }

    /// Creates an orchestrator with custom tuning.
    pub fn with_config(
        names: Arc<AdminNameResolver>,
        places: Arc<dyn PlaceSearch>,
        streets: Arc<dyn StreetIndex>,
        config: AutocompleteConfig,
    ) -> Self {
        Self {
            names,
            places,
            streets,
            cache: TtlCache::new(config.suggestion_ttl),
            debouncer: Debouncer::new(config.debounce_delay),
            config,
        }
    }

    /// The suggestion cache.
    pub fn cache(&self) -> &TtlCache<Vec<String>> {
        &self.cache
    }

    /// Returns up to ten street names matching `query` inside the selected
    /// division. Never fails; see the module docs for the pipeline.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str, ward: &str, district: &str, province: &str) -> Vec<String> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let pattern = sanitize_query(query);
        if pattern.is_empty() {
            return Vec::new();
        }

        let cache_key = suggestion_key(&pattern, district, province);
        if let Some(hit) = self.cache.get(&cache_key) {
            debug!(cache_key, count = hit.len(), "Suggestion cache hit");
            return hit;
        }

        let slot = debounce_key(district, province);
        let outcome = self
            .debouncer
            .run(&slot, || self.lookup(&pattern, ward, district, province))
            .await;

        match outcome {
            Debounced::Fired(Some(suggestions)) => {
                info!(count = suggestions.len(), "Returning street suggestions");
                self.cache.set(cache_key, suggestions.clone());
                suggestions
            }
            Debounced::Fired(None) => Vec::new(),
            Debounced::Superseded => Vec::new(),
        }
    }

    /// Stages 5 to 8. `None` means the pipeline failed and nothing may be cached.
    async fn lookup(&self, pattern: &str, ward: &str, district: &str, province: &str) -> Option<Vec<String>> {
        let (province_name, district_name, ward_name) = tokio::join!(
            self.names.resolve(province, AdminLevel::Province),
            self.names.resolve(district, AdminLevel::District),
            self.names.resolve(ward, AdminLevel::Ward),
        );

        let Some(province_name) = province_name else {
            warn!(province, "Province name unresolved, skipping street search");
            return None;
        };

        let locality = locality_string(ward_name.as_deref(), district_name.as_deref(), &province_name);
        let bbox = match self.places.bounding_box(&locality).await {
            Ok(Some(bbox)) => bbox.clamped(self.config.max_span_degrees),
            Ok(None) => {
                warn!(locality, "No bounding box for locality");
                return None;
            }
            Err(e) => {
                warn!(locality, error = %e, "Place search failed");
                return None;
            }
        };
        debug!(locality, ?bbox, "Search window");

        let names = self
            .config
            .retry
            .run("street index", || self.streets.street_names(&bbox, pattern))
            .await;

        match names {
            Ok(names) => Some(collect_suggestions(names, self.config.max_suggestions)),
            Err(e) => {
                warn!(error = %e, "Street search failed after retries");
                None
            }
        }
    }
}

#[async_trait]
impl StreetSuggester for StreetAutocomplete {
    async fn suggest(&self, request: &StreetQuery) -> Vec<String> {
        self.search(&request.query, &request.ward, &request.district, &request.province)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use diachi_core::error::{GeoError, Result};
    use diachi_core::types::BoundingBox;
    use parking_lot::Mutex;
    use test_case::test_case;
    use tokio::time::{sleep, Instant};

    use crate::names::tests::FakeDivisions;

    /// Place search returning a fixed box and recording localities.
    struct FakePlaces {
        bbox: Option<BoundingBox>,
        localities: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PlaceSearch for FakePlaces {
        async fn bounding_box(&self, locality: &str) -> Result<Option<BoundingBox>> {
            self.localities.lock().push(locality.to_string());
            Ok(self.bbox)
        }
    }

    /// Street index failing a set number of times, recording every call.
    struct FakeStreets {
        names: Vec<String>,
        failures_left: AtomicUsize,
        calls: Mutex<Vec<(Instant, BoundingBox, String)>>,
    }

    impl FakeStreets {
        fn calls(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl StreetIndex for FakeStreets {
        async fn street_names(&self, bbox: &BoundingBox, pattern: &str) -> Result<Vec<String>> {
            self.calls.lock().push((Instant::now(), *bbox, pattern.to_string()));
            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(GeoError::HttpError("connection reset".into()));
            }
            Ok(self.names.clone())
        }
    }

    struct Harness {
        divisions: Arc<FakeDivisions>,
        places: Arc<FakePlaces>,
        streets: Arc<FakeStreets>,
        autocomplete: StreetAutocomplete,
    }

    fn harness_with(bbox: Option<BoundingBox>, names: &[&str], failures: usize) -> Harness {
        let divisions = Arc::new(
            FakeDivisions::default()
                .with(AdminLevel::Province, "01", "Thành phố Hà Nội")
                .with(AdminLevel::District, "002", "Quận Hoàn Kiếm")
                .with(AdminLevel::Ward, "00037", "Phường Hàng Bạc")
                .with(AdminLevel::District, "001", "Quận Ba Đình"),
        );
        let places = Arc::new(FakePlaces {
            bbox,
            localities: Mutex::new(Vec::new()),
        });
        let streets = Arc::new(FakeStreets {
            names: names.iter().map(|s| s.to_string()).collect(),
            failures_left: AtomicUsize::new(failures),
            calls: Mutex::new(Vec::new()),
        });
        let autocomplete = StreetAutocomplete::new(
            Arc::new(AdminNameResolver::new(divisions.clone())),
            places.clone(),
            streets.clone(),
        );
        Harness {
            divisions,
            places,
            streets,
            autocomplete,
        }
    }

    fn harness() -> Harness {
        harness_with(
            Some(BoundingBox::new(21.0145, 105.8425, 21.0411, 105.8637)),
            &["Hàng Bạc", "Hàng Bè", "Hàng Bạc", "Hàng Buồm"],
            0,
        )
    }

    #[test_case("Hàng Bạc", "Hàng Bạc")]
    #[test_case("  Lý Thái Tổ  ", "Lý Thái Tổ")]
    #[test_case("Phố 'Huế'!", "Phố Huế")]
    #[test_case("ĐINH TIÊN HOÀNG", "ĐINH TIÊN HOÀNG")]
    #[test_case("<script>", "script")]
    #[test_case("@#$%", "")]
    #[test_case("Ha\u{0300}ng Ba\u{0323}c", "Hàng Bạc")]
    fn test_sanitize_query(raw: &str, expected: &str) {
        assert_eq!(sanitize_query(raw), expected);
    }

    #[test]
    fn test_locality_string_skips_missing_parts() {
        assert_eq!(
            locality_string(Some("Phường Hàng Bạc"), Some("Quận Hoàn Kiếm"), "Thành phố Hà Nội"),
            "Phường Hàng Bạc, Quận Hoàn Kiếm, Thành phố Hà Nội, Vietnam"
        );
        assert_eq!(
            locality_string(None, Some(""), "Thành phố Hà Nội"),
            "Thành phố Hà Nội, Vietnam"
        );
    }

    #[test]
    fn test_collect_suggestions_dedups_and_caps() {
        let names: Vec<String> = (0..15)
            .map(|i| format!("Street {}", i % 12))
            .chain(["".to_string()])
            .collect();
        let collected = collect_suggestions(names, 10);

        assert_eq!(collected.len(), 10);
        assert_eq!(collected[0], "Street 0");
        assert_eq!(collected[9], "Street 9");
        let unique: HashSet<_> = collected.iter().collect();
        assert_eq!(unique.len(), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_query_makes_no_calls() {
        let h = harness();

        assert!(h.autocomplete.search("a", "", "002", "01").await.is_empty());
        assert!(h.autocomplete.search("", "", "002", "01").await.is_empty());

        assert_eq!(h.divisions.calls(), 0);
        assert_eq!(h.streets.calls(), 0);
        assert!(h.autocomplete.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_sanitized_to_nothing_makes_no_calls() {
        let h = harness();

        assert!(h.autocomplete.search("!?", "", "002", "01").await.is_empty());
        assert_eq!(h.divisions.calls(), 0);
        assert_eq!(h.streets.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_pipeline_dedups_and_caches() {
        let h = harness();

        let first = h.autocomplete.search("Hàng B", "00037", "002", "01").await;
        assert_eq!(first, vec!["Hàng Bạc", "Hàng Bè", "Hàng Buồm"]);

        let localities = h.places.localities.lock().clone();
        assert_eq!(
            localities,
            vec!["Phường Hàng Bạc, Quận Hoàn Kiếm, Thành phố Hà Nội, Vietnam".to_string()]
        );
        assert_eq!(h.streets.calls.lock()[0].2, "Hàng B");

        let second = h.autocomplete.search("Hàng B", "00037", "002", "01").await;
        assert_eq!(second, first);
        assert_eq!(h.streets.calls(), 1);
        assert!(h.autocomplete.cache().has("Hàng B|002|01"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_hit_skips_debounce() {
        let h = harness();
        h.autocomplete.search("Hàng B", "", "002", "01").await;

        let start = Instant::now();
        let cached = h.autocomplete.search("Hàng B!", "", "002", "01").await;
        assert_eq!(cached.len(), 3);
        assert!(start.elapsed() < DEBOUNCE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_succeeds_on_third_attempt() {
        let h = harness_with(
            Some(BoundingBox::new(21.0145, 105.8425, 21.0411, 105.8637)),
            &["Hàng Bạc"],
            2,
        );

        let result = h.autocomplete.search("Hàng", "", "002", "01").await;
        assert_eq!(result, vec!["Hàng Bạc"]);

        let calls = h.streets.calls.lock().clone();
        assert_eq!(calls.len(), 3);
        let first_gap = calls[1].0 - calls[0].0;
        let second_gap = calls[2].0 - calls[1].0;
        assert!(first_gap >= Duration::from_secs(1));
        assert!(second_gap >= Duration::from_secs(2));
        assert!(second_gap > first_gap);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausted_degrades_without_caching() {
        let h = harness_with(
            Some(BoundingBox::new(21.0145, 105.8425, 21.0411, 105.8637)),
            &["Hàng Bạc"],
            5,
        );

        assert!(h.autocomplete.search("Hàng", "", "002", "01").await.is_empty());
        assert_eq!(h.streets.calls(), 3);
        assert!(h.autocomplete.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresolved_province_aborts() {
        let h = harness();

        assert!(h.autocomplete.search("Hàng", "", "002", "99").await.is_empty());
        assert!(h.autocomplete.search("Hàng", "", "002", "").await.is_empty());
        assert!(h.places.localities.lock().is_empty());
        assert_eq!(h.streets.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_bounding_box_aborts() {
        let h = harness_with(None, &["Hàng Bạc"], 0);

        assert!(h.autocomplete.search("Hàng", "", "002", "01").await.is_empty());
        assert_eq!(h.streets.calls(), 0);
        assert!(h.autocomplete.cache().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_wide_bounding_box_is_clamped() {
        // Whole-province box: two degrees of latitude
        let h = harness_with(Some(BoundingBox::new(20.0, 105.3, 22.0, 105.6)), &["Hàng Bạc"], 0);

        h.autocomplete.search("Hàng", "", "", "01").await;

        let bbox = h.streets.calls.lock()[0].1;
        assert!((bbox.lat_span() - 0.5).abs() < 1e-9);
        assert!((bbox.center().lat - 21.0).abs() < 1e-9);
        assert_eq!((bbox.west, bbox.east), (105.3, 105.6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_key_burst_only_last_executes() {
        let h = harness();
        let autocomplete = &h.autocomplete;

        let typed = move |query: &'static str, after: u64| async move {
            sleep(Duration::from_millis(after)).await;
            autocomplete.search(query, "", "002", "01").await
        };

        let (first, second, third) =
            tokio::join!(typed("Hà", 0), typed("Hàn", 100), typed("Hàng", 200));

        // Superseded callers resolve immediately with nothing
        assert!(first.is_empty());
        assert!(second.is_empty());
        assert_eq!(third, vec!["Hàng Bạc", "Hàng Bè", "Hàng Buồm"]);

        assert_eq!(h.streets.calls(), 1);
        assert_eq!(h.streets.calls.lock()[0].2, "Hàng");
        assert_eq!(h.autocomplete.cache().len(), 1);
        assert!(h.autocomplete.cache().has("Hàng|002|01"));
        assert!(!h.autocomplete.cache().has("Hà|002|01"));
        assert!(!h.autocomplete.cache().has("Hàn|002|01"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_different_districts_run_in_parallel() {
        let h = harness();

        let start = Instant::now();
        let (hoan_kiem, ba_dinh) = tokio::join!(
            h.autocomplete.search("Hàng", "", "002", "01"),
            h.autocomplete.search("Hàng", "", "001", "01"),
        );

        assert_eq!(hoan_kiem.len(), 3);
        assert_eq!(ba_dinh.len(), 3);
        assert_eq!(h.streets.calls(), 2);
        assert!(start.elapsed() < DEBOUNCE_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_trait_delegates_to_search() {
        let h = harness();
        let suggester: &dyn StreetSuggester = &h.autocomplete;

        let request = StreetQuery::new("Hàng").district("002").province("01");
        assert_eq!(suggester.suggest(&request).await.len(), 3);
    }
}
