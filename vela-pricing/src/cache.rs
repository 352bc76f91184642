//! Cache - key to (price, timestamp) store with expiry
//!
//! Constructed once by the caller and injected into the source chain;
//! there is no ambient global. The store is a flat map persisted as a
//! whole JSON record, so concurrent writers last-write-wins without
//! corrupting individual entries.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::quote::UnitPrice;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    price: UnitPrice,
    cached_at: DateTime<Utc>,
}

/// In-process price cache with optional JSON file persistence.
pub struct PriceCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    path: Option<PathBuf>,
}

impl PriceCache {
    pub const DEFAULT_TTL_HOURS: i64 = 24;

    /// Memory-only cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(Self::DEFAULT_TTL_HOURS))
    }

    /// Memory-only cache with a specific TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            path: None,
        }
    }

    /// File-backed cache: loads any existing store at `path` and
    /// persists the whole store on every write. An unreadable or
    /// corrupt store starts empty instead of failing.
    pub fn with_file(path: PathBuf) -> Self {
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, CacheEntry>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt price cache");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Self {
            entries: Mutex::new(entries),
            ttl: Duration::hours(Self::DEFAULT_TTL_HOURS),
            path: Some(path),
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Fetch an entry if present and not expired. Expired entries are
    /// evicted on the way out.
    pub fn get(&self, key: &str) -> Option<UnitPrice> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if Utc::now() - entry.cached_at < self.ttl => {
                tracing::debug!(key, "price cache hit");
                Some(entry.price)
            }
            Some(_) => {
                tracing::debug!(key, "price cache entry expired");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store an entry, last write wins. The on-disk store, when
    /// configured, is rewritten as one record.
    pub fn put(&self, key: &str, price: UnitPrice) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        entries.insert(
            key.to_string(),
            CacheEntry {
                price,
                cached_at: Utc::now(),
            },
        );
        if let Some(path) = &self.path {
            match serde_json::to_string_pretty(&*entries) {
                Ok(content) => {
                    if let Err(e) = std::fs::write(path, content) {
                        tracing::warn!(path = %path.display(), error = %e, "price cache write failed");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "price cache serialization failed"),
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get() {
        let cache = PriceCache::new();
        assert!(cache.get("aws:compute:t2.micro:us-east-1").is_none());

        cache.put("aws:compute:t2.micro:us-east-1", UnitPrice::per_hour(0.0116));
        let hit = cache.get("aws:compute:t2.micro:us-east-1").unwrap();
        assert_eq!(hit.amount, 0.0116);
    }

    #[test]
    fn expired_entries_are_evicted() {
        let cache = PriceCache::with_ttl(Duration::zero());
        cache.put("k", UnitPrice::per_hour(1.0));

        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn last_write_wins() {
        let cache = PriceCache::new();
        cache.put("k", UnitPrice::per_hour(1.0));
        cache.put("k", UnitPrice::per_hour(2.0));
        assert_eq!(cache.get("k").unwrap().amount, 2.0);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");

        let cache = PriceCache::with_file(path.clone());
        cache.put("azure:compute:Standard_B1s:eastus", UnitPrice::per_hour(0.012));
        drop(cache);

        let reloaded = PriceCache::with_file(path);
        let hit = reloaded.get("azure:compute:Standard_B1s:eastus").unwrap();
        assert_eq!(hit.amount, 0.012);
    }

    #[test]
    fn corrupt_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.json");
        std::fs::write(&path, "not json at all").unwrap();

        let cache = PriceCache::with_file(path);
        assert!(cache.is_empty());
    }
}
