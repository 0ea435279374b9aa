//! Time-limited cache over a `CacheStorage` slot.
//!
//! Entries are stored as `{"data": ..., "timestamp": <epoch ms>}`. An entry
//! is valid while `now - timestamp <= ttl`; expired or unreadable entries are
//! removed and reported as absent. Nothing in here returns an error.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::storage::CacheStorage;

/// Five minutes.
pub const DEFAULT_TTL_MS: u64 = 5 * 60 * 1000;

/// Storage key for the cached history listing.
pub const HISTORY_CACHE_KEY: &str = "weatherHistory";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub data: T,
    pub timestamp: i64,
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheRead<T> {
    Hit(T),
    Miss,
    Expired,
    Corrupt,
}

impl<T> CacheRead<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            CacheRead::Hit(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, CacheRead::Hit(_))
    }
}

/// Result of a cache write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheWrite {
    Stored,
    /// The value could not be stored; the slot has been cleared.
    Degraded,
}

pub struct TtlCache<T> {
    key: String,
    ttl_ms: u64,
    storage: Arc<dyn CacheStorage>,
    clock: Arc<dyn Clock>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> TtlCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(key: impl Into<String>, storage: Arc<dyn CacheStorage>) -> Self {
        Self {
            key: key.into(),
            ttl_ms: DEFAULT_TTL_MS,
            storage,
            clock: Arc::new(SystemClock),
            _marker: PhantomData,
        }
    }

    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    /// Look up the entry, evicting it if expired or unreadable.
    pub fn read(&self) -> CacheRead<T> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return CacheRead::Miss,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", self.key, e);
                self.evict();
                return CacheRead::Corrupt;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", self.key, e);
                self.evict();
                return CacheRead::Corrupt;
            }
        };

        if self.is_expired(entry.timestamp) {
            tracing::debug!("Cache entry {} expired", self.key);
            self.evict();
            return CacheRead::Expired;
        }

        CacheRead::Hit(entry.data)
    }

    /// Read the stored value regardless of age.
    pub fn read_stale(&self) -> Option<T> {
        let raw = self.storage.get(&self.key).ok().flatten()?;
        serde_json::from_str::<CacheEntry<T>>(&raw)
            .ok()
            .map(|entry| entry.data)
    }

    /// Store `data` stamped with the current time.
    pub fn write(&self, data: &T) -> CacheWrite {
        let entry = CacheEntry {
            data,
            timestamp: self.clock.now_millis(),
        };

        let stored = serde_json::to_string(&entry)
            .map_err(|e| e.to_string())
            .and_then(|json| {
                self.storage
                    .set(&self.key, &json)
                    .map_err(|e| e.to_string())
            });

        match stored {
            Ok(()) => CacheWrite::Stored,
            Err(e) => {
                tracing::warn!("Cache write failed for {}: {}", self.key, e);
                self.evict();
                CacheWrite::Degraded
            }
        }
    }

    pub fn clear(&self) {
        self.evict();
    }

    fn is_expired(&self, timestamp: i64) -> bool {
        let age = self.clock.now_millis().saturating_sub(timestamp);
        age > i64::try_from(self.ttl_ms).unwrap_or(i64::MAX)
    }

    fn evict(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!("Failed to remove cache entry {}: {}", self.key, e);
        }
    }
}

impl<T> std::fmt::Debug for TtlCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("key", &self.key)
            .field("ttl_ms", &self.ttl_ms)
            .finish_non_exhaustive()
    }
}
