//! In-memory TTL cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use serde::Serialize;

/// Cache entry. Owned by the cache; callers only ever see clones of `value`.
#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() >= ttl
    }
}

/// Key/value store whose entries expire a fixed time after insertion.
///
/// Thread-safe. No capacity bound: the key spaces it serves (division codes,
/// short query strings) are small in practice. Entries are replaced
/// wholesale, never mutated in place.
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Gets a live value by key.
    ///
    /// An expired entry is evicted and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.upgradable_read();
        match entries.get(key) {
            None => return None,
            Some(entry) if !entry.is_expired(self.ttl) => return Some(entry.value.clone()),
            Some(_) => {}
        }

        let mut entries = RwLockUpgradableReadGuard::upgrade(entries);
        entries.remove(key);
        None
    }

    /// Returns true if a live value exists for `key`. Evicts like [`get`](Self::get).
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Stores a value stamped with the current time, replacing any prior entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.entries.write().insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Removes an entry.
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Removes all expired entries.
    pub fn cleanup_expired(&self) {
        let ttl = self.ttl;
        self.entries.write().retain(|_, e| !e.is_expired(ttl));
    }

    /// Returns the number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let expired = entries.values().filter(|e| e.is_expired(self.ttl)).count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            ttl_seconds: self.ttl.as_secs(),
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Serialize)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries awaiting eviction
    pub expired_entries: usize,
    /// Live entries
    pub valid_entries: usize,
    /// Entry lifetime
    pub ttl_seconds: u64,
}
