//! Per-source cache for upstream API payloads
//!
//! Provides a `SourceCache` that stores serializable payloads in memory with
//! the instant they were fetched, supporting graceful degradation when an
//! upstream is unavailable or rate limited.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::clock::Clock;

/// A cached payload stored as JSON
#[derive(Debug, Clone)]
struct CacheEntry {
    /// The cached payload
    data: serde_json::Value,
    /// When the payload was fetched
    cached_at: DateTime<Utc>,
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    /// Whether the entry is older than the TTL it was read with
    pub is_expired: bool,
}

/// Keyed store of `(payload, fetched_at)` pairs shared by the source clients
///
/// Entries are never evicted. Freshness is decided at read time against the
/// TTL the caller passes, so one key can be read fresh by the normal path
/// and stale by the fallback path. Clones share the same underlying map.
#[derive(Debug, Clone)]
pub struct SourceCache {
    entries: Arc<DashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl SourceCache {
    /// Creates an empty cache reading time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Writes data to the cache, replacing any previous entry for `key`
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if `data` cannot be represented as JSON
    pub fn write<T: Serialize>(&self, key: &str, data: &T) -> Result<(), serde_json::Error> {
        let entry = CacheEntry {
            data: serde_json::to_value(data)?,
            cached_at: self.clock.now(),
        };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    /// Reads data from the cache
    ///
    /// Returns `Some(CachedData)` with `is_expired = true` if the entry exists
    /// but is at least `ttl` old. Returns `None` if the entry doesn't exist or
    /// cannot be decoded as `T`.
    pub fn read<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<CachedData<T>> {
        let (value, cached_at) = {
            let entry = self.entries.get(key)?;
            (entry.data.clone(), entry.cached_at)
        };
        let data = serde_json::from_value(value).ok()?;

        let age = self.clock.now() - cached_at;
        Some(CachedData {
            data,
            cached_at,
            is_expired: age >= ttl,
        })
    }

    /// Fresh read: the payload only while `now - fetched_at < ttl`
    pub fn get<T: DeserializeOwned>(&self, key: &str, ttl: Duration) -> Option<T> {
        self.read(key, ttl)
            .filter(|cached| !cached.is_expired)
            .map(|cached| cached.data)
    }

    /// Stale read: the last payload written for `key`, regardless of age
    pub fn get_stale<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.entries.get(key)?.data.clone();
        serde_json::from_value(value).ok()
    }

    /// Writes `data`, logging instead of failing when it cannot be encoded
    pub fn set<T: Serialize>(&self, key: &str, data: &T) {
        if let Err(e) = self.write(key, data) {
            warn!(key, error = %e, "failed to cache payload");
        }
    }

    /// Number of keys currently held
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
