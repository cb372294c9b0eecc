//! Capacity-bounded, concurrency-safe record cache.
//!
//! # Architecture
//!
//! All entries live behind a single `parking_lot::RwLock`:
//! - reads (`get`, `list`, `size`) share the lock
//! - mutations (`set`, `remove`, `clear`, `purge_expired`) take it exclusively
//!
//! There is no other path to the underlying map, so a reader can never see a
//! half-written entry and `list` always returns values that were stored.
//!
//! # Eviction Policy
//!
//! Oldest-inserted first. Each `set` stamps the entry with a monotonically
//! increasing insertion sequence; upserting an existing key re-stamps it.
//! When a new key arrives at capacity, the entry with the smallest sequence is
//! evicted before the new one is admitted. The policy is deterministic and
//! independent of hash iteration order.
//!
//! # Expiry
//!
//! When a TTL is configured, entries older than the TTL are reported absent
//! by `get` and skipped by `list`. They still occupy a slot until
//! `purge_expired` runs or they are evicted; because they are always the
//! oldest entries, eviction reclaims them first.
//!
//! # Example
//!
//! ```rust,ignore
//! use gofed_domain::cache::{BoundedCache, BoundedCacheConfig};
//!
//! let cache = BoundedCache::new(BoundedCacheConfig::new(2))?;
//! cache.set("1", "alice");
//! cache.set("2", "bob");
//! cache.set("3", "charlie"); // evicts "1"
//!
//! assert_eq!(cache.size(), 2);
//! assert_eq!(cache.get("1"), None);
//! ```

#[cfg(test)]
mod cache_proptest;

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;
use tracing::trace;

use crate::error::{CacheError, CacheResult};

/// Configuration for a bounded cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedCacheConfig {
    /// Maximum number of entries.
    pub capacity: usize,
    /// Optional time-to-live for entries.
    pub ttl: Option<Duration>,
}

impl BoundedCacheConfig {
    /// Creates a configuration with the given capacity and no TTL.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ttl: None,
        }
    }

    /// Sets the TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// A stored value together with its insertion stamp.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    sequence: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Option<Duration>, now: Instant) -> bool {
        ttl.is_some_and(|ttl| now.duration_since(self.inserted_at) >= ttl)
    }
}

/// State guarded by the cache lock.
#[derive(Debug)]
struct CacheState<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion sequence -> key, oldest first.
    order: BTreeMap<u64, String>,
    next_sequence: u64,
}

impl<V> CacheState<V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: BTreeMap::new(),
            next_sequence: 0,
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.sequence);
        Some(entry)
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.entries.remove(&key);
        Some(key)
    }
}

/// Counters sampled by [`BoundedCache::stats`].
#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

/// Snapshot of cache occupancy and effectiveness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub ttl: Option<Duration>,
}

impl CacheStats {
    /// Returns hits / (hits + misses), or 0.0 before any lookup.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Capacity-bounded map from string keys to records.
///
/// # Thread Safety
///
/// The cache is `Send + Sync` for `V: Send + Sync` and is meant to be shared
/// through an `Arc` by every caller in the process.
pub struct BoundedCache<V> {
    state: RwLock<CacheState<V>>,
    config: BoundedCacheConfig,
    counters: CacheCounters,
}

impl<V> std::fmt::Debug for BoundedCache<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedCache")
            .field("config", &self.config)
            .field("size", &self.state.read().entries.len())
            .finish()
    }
}

impl<V: Clone> BoundedCache<V> {
    /// Creates an empty cache. Zero capacity is rejected.
    pub fn new(config: BoundedCacheConfig) -> CacheResult<Self> {
        if config.capacity == 0 {
            return Err(CacheError::InvalidCapacity {
                capacity: config.capacity,
            });
        }

        Ok(Self {
            state: RwLock::new(CacheState::new()),
            config,
            counters: CacheCounters::default(),
        })
    }

    /// Returns the configuration for this cache.
    pub fn config(&self) -> &BoundedCacheConfig {
        &self.config
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Looks up a live entry.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let value = {
            let state = self.state.read();
            state
                .entries
                .get(key)
                .filter(|entry| !entry.is_expired(self.config.ttl, now))
                .map(|entry| entry.value.clone())
        };

        let counter = if value.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        value
    }

    /// Inserts or replaces `key`.
    ///
    /// Returns the key that was evicted to make room, if any.
    pub fn set(&self, key: impl Into<String>, value: V) -> Option<String> {
        let key = key.into();
        let mut state = self.state.write();
        // Stamped under the lock so insertion times follow sequence order.
        let now = Instant::now();

        let evicted = if state.remove(&key).is_none()
            && state.entries.len() >= self.config.capacity
        {
            state.evict_oldest()
        } else {
            None
        };

        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state.order.insert(sequence, key.clone());
        state.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: now,
                sequence,
            },
        );
        drop(state);

        if let Some(evicted_key) = &evicted {
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            trace!(key = %evicted_key, "evicted oldest cache entry");
        }
        evicted
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&self, key: &str) -> Option<V> {
        self.state.write().remove(key).map(|entry| entry.value)
    }

    /// Returns every live value, oldest insertion first.
    pub fn list(&self) -> Vec<V> {
        let now = Instant::now();
        let state = self.state.read();
        state
            .order
            .values()
            .filter_map(|key| state.entries.get(key))
            .filter(|entry| !entry.is_expired(self.config.ttl, now))
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        state.order.clear();
    }

    /// Drops entries older than the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let Some(ttl) = self.config.ttl else {
            return 0;
        };

        let now = Instant::now();
        let mut state = self.state.write();
        let mut purged = 0;
        // Oldest first: stop at the first entry that is still live.
        while let Some((_, key)) = state.order.first_key_value() {
            let expired = state
                .entries
                .get(key)
                .map_or(true, |entry| entry.is_expired(Some(ttl), now));
            if !expired {
                break;
            }
            state.evict_oldest();
            purged += 1;
        }
        purged
    }

    /// Returns the number of stored entries, including expired ones not yet purged.
    pub fn size(&self) -> usize {
        self.state.read().entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Returns a snapshot of occupancy and hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.size(),
            capacity: self.config.capacity,
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            ttl: self.config.ttl,
        }
    }
}
