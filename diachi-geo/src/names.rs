//! Cached administrative code → name resolution.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument, warn};

use diachi_cache::TtlCache;
use diachi_core::constants::ADMIN_NAME_TTL;
use diachi_core::traits::DivisionSource;
use diachi_core::types::AdminLevel;

/// Resolves division codes to human-readable names.
///
/// A missing name is a legitimate degraded state, so every failure maps to
/// `None`. Names are cached per `(level, code)`.
pub struct AdminNameResolver {
    source: Arc<dyn DivisionSource>,
    cache: TtlCache<String>,
}

impl AdminNameResolver {
    /// Creates a resolver with the standard 24h name cache.
    pub fn new(source: Arc<dyn DivisionSource>) -> Self {
        Self::with_ttl(source, ADMIN_NAME_TTL)
    }

    /// Creates a resolver with a custom cache lifetime.
    pub fn with_ttl(source: Arc<dyn DivisionSource>, ttl: Duration) -> Self {
        Self {
            source,
            cache: TtlCache::new(ttl),
        }
    }

    /// Resolves `code` at `level`.
    ///
    /// Empty codes resolve to `None` without touching the provider.
    #[instrument(skip(self))]
    pub async fn resolve(&self, code: &str, level: AdminLevel) -> Option<String> {
        if code.is_empty() {
            return None;
        }

        let key = cache_key(level, code);
        if let Some(name) = self.cache.get(&key) {
            debug!(key, "Name cache hit");
            return Some(name);
        }

        match self.source.lookup(level, code).await {
            Ok(Some(unit)) => {
                debug!(key, name = %unit.name, "Cached division name");
                self.cache.set(key, unit.name.clone());
                Some(unit.name)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%level, code, error = %e, "Division name lookup failed");
                None
            }
        }
    }

    /// Resolves `code` for a level given by name.
    ///
    /// Unknown level names resolve to `None` without touching the provider.
    pub async fn resolve_kind(&self, code: &str, kind: &str) -> Option<String> {
        match AdminLevel::parse(kind) {
            Some(level) => self.resolve(code, level).await,
            None => None,
        }
    }

    /// The name cache.
    pub fn cache(&self) -> &TtlCache<String> {
        &self.cache
    }
}

fn cache_key(level: AdminLevel, code: &str) -> String {
    format!("{}-{}", level, code)
}
