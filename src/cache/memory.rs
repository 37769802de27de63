// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! In-memory cache tier.
//!
//! Bounded map with per-entry TTL and oldest-insertion eviction (approximate
//! LRU: reads do not refresh recency).
//!
//! # Flow
//!
//! ```text
//! get(key)
//!   ├─→ absent            → miss
//!   ├─→ expired           → remove (lazy), miss
//!   └─→ fresh             → hit
//!
//! set(key)
//!   └─→ one lock scope: while full → drop oldest inserted; insert
//! ```
//!
//! Every composite read-modify-write happens inside a single lock scope with
//! no `.await`, so concurrent requests cannot interleave between the size
//! check, the eviction and the insert.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use super::entry::{now_millis, CacheEntry, CachedSearch};
use super::traits::{CacheError, CacheSource, CacheTier};
use crate::metrics;

struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    /// Insertion order for eviction (oldest first)
    order: VecDeque<String>,
}

impl<T> Inner<T> {
    fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }
}

/// Memory cache statistics
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryCacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Entries dropped because their TTL elapsed
    pub expired: u64,
    /// Entries dropped to make room
    pub evictions: u64,
    pub entry_count: usize,
    /// Hit rate (0.0 - 1.0)
    pub hit_rate: f64,
}

pub struct MemoryCache<T> {
    inner: Mutex<Inner<T>>,
    max_entries: usize,
    default_ttl_ms: u64,
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    evictions: AtomicU64,
}

impl<T: Clone> MemoryCache<T> {
    #[must_use]
    pub fn new(max_entries: usize, default_ttl_ms: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            max_entries,
            default_ttl_ms,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            expired: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Fresh value for `key`, evicting it if its TTL elapsed.
    pub fn get_entry(&self, key: &str) -> Option<T> {
        let now = now_millis();
        let mut inner = self.inner.lock();

        let expired = match inner.entries.get(key) {
            Some(entry) if !entry.is_expired_at(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.data.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            inner.remove(key);
            self.expired.fetch_add(1, Ordering::Relaxed);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Insert, evicting the oldest entries while at capacity.
    ///
    /// A cache built with `max_entries == 0` stores nothing.
    pub fn insert(&self, key: &str, data: T, ttl_ms: Option<u64>) {
        if self.max_entries == 0 {
            return;
        }
        let entry = CacheEntry::new(data, ttl_ms.unwrap_or(self.default_ttl_ms));
        let mut inner = self.inner.lock();

        if !inner.entries.contains_key(key) {
            let mut evicted = 0;
            while inner.entries.len() >= self.max_entries {
                match inner.order.pop_front() {
                    Some(old_key) => {
                        inner.entries.remove(&old_key);
                        evicted += 1;
                    }
                    None => break,
                }
            }
            if evicted > 0 {
                self.evictions.fetch_add(evicted, Ordering::Relaxed);
            }
            inner.order.push_back(key.to_string());
        }
        inner.entries.insert(key.to_string(), entry);

        metrics::set_memory_cache_entries(inner.entries.len());
    }

    pub fn remove(&self, key: &str) -> bool {
        self.inner.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
        metrics::set_memory_cache_entries(0);
    }

    /// Drop every expired entry. Optional: `get` already evicts lazily.
    pub fn purge_expired(&self) -> usize {
        let now = now_millis();
        let mut inner = self.inner.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired_at(now));
        let Inner { entries, order } = &mut *inner;
        order.retain(|k| entries.contains_key(k));
        let purged = before - entries.len();
        self.expired.fetch_add(purged as u64, Ordering::Relaxed);
        purged
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> MemoryCacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        MemoryCacheStats {
            hits,
            misses,
            expired: self.expired.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            entry_count: self.len(),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

#[async_trait]
impl CacheTier for MemoryCache<CachedSearch> {
    fn source(&self) -> CacheSource {
        CacheSource::Memory
    }

    async fn get(&self, key: &str) -> Result<Option<CachedSearch>, CacheError> {
        Ok(self.get_entry(key))
    }

    async fn set(&self, key: &str, value: &CachedSearch, ttl_ms: Option<u64>) -> Result<(), CacheError> {
        self.insert(key, value.clone(), ttl_ms);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        MemoryCache::clear(self);
        Ok(())
    }
}
