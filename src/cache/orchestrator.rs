// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cache orchestration across tiers.
//!
//! # Lookup
//!
//! ```text
//! lookup(query, filters, edited_only)
//!       │
//!       ├─→ Static  (popular query, no filters, not edited-only) key = slug
//!       ├─→ Edge    key = search:<slug>[:filters][:edited]
//!       └─→ Memory  same composite key
//!
//! First hit wins. Tier errors are logged and count as misses.
//! ```
//!
//! # Write-through
//!
//! [`CacheOrchestrator::store`] writes every writable tier concurrently and
//! settles all of them: one tier failing never blocks or fails another. The
//! static tier is never written at request time.
//!
//! There is no single-flight: two requests missing the same cold key both go
//! to the backend.

use futures::future::join_all;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::entry::{CachedResult, CachedSearch};
use super::keys::{generate_cache_key, static_cache_key};
use super::memory::MemoryCache;
use super::edge::RedisEdgeCache;
use super::static_files::StaticFileCache;
use super::traits::{CacheSource, CacheTier};
use crate::config::SearchConfig;
use crate::metrics;
use crate::query::QueryValidator;
use crate::search::{CacheMeta, SearchStats};

/// A cached result plus where and how fast it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub cached: CachedSearch,
    pub meta: CacheMeta,
}

/// Per-tier lookup counters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierStats {
    pub source: CacheSource,
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
}

struct TierSlot {
    tier: Arc<dyn CacheTier>,
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
}

impl TierSlot {
    fn new(tier: Arc<dyn CacheTier>) -> Self {
        Self {
            tier,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }
}

fn priority(source: CacheSource) -> u8 {
    match source {
        CacheSource::Static => 0,
        CacheSource::Edge => 1,
        CacheSource::Memory => 2,
        CacheSource::None => u8::MAX,
    }
}

pub struct CacheOrchestrator {
    /// Tiers in lookup priority order
    slots: Vec<TierSlot>,
    /// Sanitized, lowercased popular queries
    popular: HashSet<String>,
    validator: QueryValidator,
    min_cacheable_query_length: usize,
    edge_ttl_ms: u64,
    memory_ttl_ms: u64,
}

impl CacheOrchestrator {
    /// An orchestrator with no tiers; add them with [`Self::with_tier`].
    pub fn new(config: &SearchConfig) -> Self {
        let validator = QueryValidator::from_config(config);
        Self {
            slots: Vec::new(),
            popular: config
                .popular_queries
                .iter()
                .map(|q| validator.sanitize(q).to_lowercase())
                .collect(),
            validator,
            min_cacheable_query_length: config.min_cacheable_query_length,
            edge_ttl_ms: config.edge_ttl_ms,
            memory_ttl_ms: config.memory_ttl_ms,
        }
    }

    /// Add a tier; tiers are kept sorted static → edge → memory.
    #[must_use]
    pub fn with_tier(mut self, tier: Arc<dyn CacheTier>) -> Self {
        self.slots.push(TierSlot::new(tier));
        self.slots.sort_by_key(|slot| priority(slot.tier.source()));
        self
    }

    /// Build every tier the config enables.
    ///
    /// The memory tier is always present. An unreachable edge store is logged
    /// and skipped rather than failing startup.
    pub async fn from_config(config: &SearchConfig) -> Self {
        let memory: Arc<dyn CacheTier> = Arc::new(MemoryCache::<CachedSearch>::new(
            config.memory_max_entries,
            config.memory_ttl_ms,
        ));
        let mut orchestrator = Self::new(config).with_tier(memory);

        if let Some(ref dir) = config.static_dir {
            orchestrator = orchestrator.with_tier(Arc::new(StaticFileCache::new(dir)));
        }

        if let Some(ref url) = config.redis_url {
            match RedisEdgeCache::connect(url, config.redis_prefix.as_deref(), config.edge_ttl_ms).await {
                Ok(edge) => orchestrator = orchestrator.with_tier(Arc::new(edge)),
                Err(e) => warn!(error = %e, "Edge cache unavailable, continuing without it"),
            }
        }

        info!(tiers = ?orchestrator.sources(), "Search cache tiers ready");
        orchestrator
    }

    /// Sources of the configured tiers, in lookup order
    pub fn sources(&self) -> Vec<CacheSource> {
        self.slots.iter().map(|slot| slot.tier.source()).collect()
    }

    /// Whether `query` is one of the curated popular queries.
    ///
    /// Both sides go through the request sanitizer, so `"Rock & Roll "` and
    /// `"rock  roll"` name the same popular query.
    pub fn is_random_query(&self, query: &str) -> bool {
        self.popular.contains(&self.validator.sanitize(query).to_lowercase())
    }

    /// Whether a fresh result for `query` is worth caching.
    ///
    /// Popular queries are served by the static tier and never duplicated
    /// elsewhere. Otherwise only queries longer than the minimum with at least
    /// one hit are cached: empty results are never cached.
    pub fn should_cache(&self, query: &str, stats: &SearchStats) -> bool {
        if self.is_random_query(query) {
            return false;
        }
        query.trim().chars().count() > self.min_cacheable_query_length
            && stats.estimated_total_hits > 0
    }

    fn key_for(&self, source: CacheSource, query: &str, filters: &[String], edited_only: bool) -> Option<String> {
        match source {
            CacheSource::Static => {
                let eligible = filters.is_empty() && !edited_only && self.is_random_query(query);
                eligible.then(|| static_cache_key(query))
            }
            CacheSource::Edge | CacheSource::Memory => {
                Some(generate_cache_key(query, filters, edited_only))
            }
            CacheSource::None => None,
        }
    }

    fn ttl_for(&self, source: CacheSource) -> u64 {
        match source {
            CacheSource::Memory => self.memory_ttl_ms,
            _ => self.edge_ttl_ms,
        }
    }

    /// Probe tiers in priority order; first fresh hit wins.
    pub async fn lookup(&self, query: &str, filters: &[String], edited_only: bool) -> Option<CacheHit> {
        let start = Instant::now();

        for slot in &self.slots {
            let source = slot.tier.source();
            let Some(key) = self.key_for(source, query, filters, edited_only) else {
                continue;
            };

            match slot.tier.get(&key).await {
                Ok(Some(cached)) => {
                    slot.hits.fetch_add(1, Ordering::Relaxed);
                    metrics::record_cache_lookup(source.as_str(), "hit");
                    let elapsed = start.elapsed();
                    debug!(query = %query, tier = %source, key = %key, "Search cache hit");
                    return Some(CacheHit {
                        cached,
                        meta: CacheMeta {
                            cache_hit: true,
                            cache_source: source,
                            cache_response_time_ms: elapsed.as_millis() as u64,
                        },
                    });
                }
                Ok(None) => {
                    slot.misses.fetch_add(1, Ordering::Relaxed);
                    metrics::record_cache_lookup(source.as_str(), "miss");
                }
                Err(e) => {
                    slot.errors.fetch_add(1, Ordering::Relaxed);
                    metrics::record_cache_lookup(source.as_str(), "error");
                    warn!(query = %query, tier = %source, key = %key, error = %e, "Cache tier lookup failed, treating as miss");
                }
            }
        }

        None
    }

    /// Write a result through to every writable tier. Returns how many
    /// tiers accepted the write.
    pub async fn store(&self, query: &str, filters: &[String], edited_only: bool, result: CachedResult) -> usize {
        let key = generate_cache_key(query, filters, edited_only);

        let writes = self
            .slots
            .iter()
            .filter(|slot| !slot.tier.is_read_only())
            .map(|slot| {
                let source = slot.tier.source();
                let ttl = self.ttl_for(source);
                let value = CachedSearch::new(query, result.clone(), ttl);
                let key = key.clone();
                async move {
                    let outcome = slot.tier.set(&key, &value, Some(ttl)).await;
                    (source, outcome)
                }
            });

        let mut written = 0;
        for (source, outcome) in join_all(writes).await {
            match outcome {
                Ok(()) => {
                    written += 1;
                    metrics::record_cache_write(source.as_str(), "success");
                }
                Err(e) => {
                    metrics::record_cache_write(source.as_str(), "error");
                    warn!(query = %query, tier = %source, key = %key, error = %e, "Cache write failed");
                }
            }
        }

        debug!(query = %query, key = %key, written, "Search result cached");
        written
    }

    /// Remove a key from every writable tier (settle-all).
    pub async fn invalidate(&self, query: &str, filters: &[String], edited_only: bool) {
        let key = generate_cache_key(query, filters, edited_only);
        let deletes = self
            .slots
            .iter()
            .filter(|slot| !slot.tier.is_read_only())
            .map(|slot| {
                let key = key.clone();
                async move { (slot.tier.source(), slot.tier.delete(&key).await) }
            });

        for (source, outcome) in join_all(deletes).await {
            if let Err(e) = outcome {
                warn!(tier = %source, key = %key, error = %e, "Cache delete failed");
            }
        }
    }

    /// Clear every writable tier (settle-all).
    pub async fn clear(&self) {
        let clears = self
            .slots
            .iter()
            .filter(|slot| !slot.tier.is_read_only())
            .map(|slot| async move { (slot.tier.source(), slot.tier.clear().await) });

        for (source, outcome) in join_all(clears).await {
            if let Err(e) = outcome {
                warn!(tier = %source, error = %e, "Cache clear failed");
            }
        }
    }

    pub fn stats(&self) -> Vec<TierStats> {
        self.slots
            .iter()
            .map(|slot| TierStats {
                source: slot.tier.source(),
                hits: slot.hits.load(Ordering::Relaxed),
                misses: slot.misses.load(Ordering::Relaxed),
                errors: slot.errors.load(Ordering::Relaxed),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheError;
    use async_trait::async_trait;

    /// Tier that fails every operation
    struct BrokenTier(CacheSource);

    #[async_trait]
    impl CacheTier for BrokenTier {
        fn source(&self) -> CacheSource {
            self.0
        }
        async fn get(&self, _key: &str) -> Result<Option<CachedSearch>, CacheError> {
            Err(CacheError::Backend("connection reset".into()))
        }
        async fn set(&self, _key: &str, _value: &CachedSearch, _ttl_ms: Option<u64>) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection reset".into()))
        }
        async fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection reset".into()))
        }
        async fn clear(&self) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection reset".into()))
        }
    }

    fn result(total: u64) -> CachedResult {
        CachedResult {
            hits: vec![],
            stats: SearchStats {
                estimated_total_hits: total,
                ..Default::default()
            },
            has_more: false,
        }
    }

    fn stats(total: u64) -> SearchStats {
        SearchStats {
            estimated_total_hits: total,
            ..Default::default()
        }
    }

    fn memory() -> Arc<MemoryCache<CachedSearch>> {
        Arc::new(MemoryCache::new(100, 60_000))
    }

    #[test]
    fn test_should_cache_boundaries() {
        let orchestrator = CacheOrchestrator::new(&SearchConfig::default());
        assert!(!orchestrator.should_cache("ab", &stats(5)));
        assert!(!orchestrator.should_cache("abc", &stats(0)));
        assert!(orchestrator.should_cache("abc", &stats(1)));
        assert!(!orchestrator.should_cache("  ab  ", &stats(5)));
    }

    #[test]
    fn test_popular_queries_never_cached() {
        let orchestrator = CacheOrchestrator::new(&SearchConfig::default());
        assert!(orchestrator.is_random_query("Bread"));
        assert!(orchestrator.is_random_query(" bread "));
        assert!(!orchestrator.is_random_query("bread loaf"));
        assert!(!orchestrator.should_cache("bread", &stats(100)));
    }

    #[test]
    fn test_popular_queries_match_after_sanitizing() {
        let config = SearchConfig {
            popular_queries: vec!["Rock & Roll".into(), "rock'n'roll".into()],
            ..Default::default()
        };
        let orchestrator = CacheOrchestrator::new(&config);

        assert!(orchestrator.is_random_query("rock  roll"));
        assert!(orchestrator.is_random_query("rock & roll"));
        assert!(orchestrator.is_random_query("rocknroll"));
        assert!(!orchestrator.should_cache("rock roll", &stats(10)));
    }

    #[test]
    fn test_tiers_sorted_by_priority() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = CacheOrchestrator::new(&SearchConfig::default())
            .with_tier(memory())
            .with_tier(Arc::new(BrokenTier(CacheSource::Edge)))
            .with_tier(Arc::new(StaticFileCache::new(dir.path())));
        assert_eq!(
            orchestrator.sources(),
            vec![CacheSource::Static, CacheSource::Edge, CacheSource::Memory]
        );
    }

    #[tokio::test]
    async fn test_store_then_lookup() {
        let orchestrator = CacheOrchestrator::new(&SearchConfig::default()).with_tier(memory());
        let filters = vec!["b".to_string(), "a".to_string()];

        assert!(orchestrator.lookup("ghost town", &filters, false).await.is_none());
        assert_eq!(orchestrator.store("ghost town", &filters, false, result(3)).await, 1);

        let reordered = vec!["a".to_string(), "b".to_string()];
        let hit = orchestrator.lookup("ghost town", &reordered, false).await.unwrap();
        assert!(hit.meta.cache_hit);
        assert_eq!(hit.meta.cache_source, CacheSource::Memory);
        assert_eq!(hit.cached.result.stats.estimated_total_hits, 3);

        // edited-only is a different key
        assert!(orchestrator.lookup("ghost town", &filters, true).await.is_none());
    }

    #[tokio::test]
    async fn test_broken_tier_is_a_miss_and_does_not_block_writes() {
        let orchestrator = CacheOrchestrator::new(&SearchConfig::default())
            .with_tier(Arc::new(BrokenTier(CacheSource::Edge)))
            .with_tier(memory());

        assert_eq!(orchestrator.store("haunted", &[], false, result(2)).await, 1);

        let hit = orchestrator.lookup("haunted", &[], false).await.unwrap();
        assert_eq!(hit.meta.cache_source, CacheSource::Memory);

        let stats = orchestrator.stats();
        assert_eq!(stats[0].source, CacheSource::Edge);
        assert_eq!(stats[0].errors, 1);
        assert_eq!(stats[1].hits, 1);
    }

    #[tokio::test]
    async fn test_static_tier_only_for_unfiltered_popular_queries() {
        let dir = tempfile::tempdir().unwrap();
        let cached = CachedSearch::new("bread", result(77), 60_000);
        std::fs::write(dir.path().join("bread.json"), serde_json::to_vec(&cached).unwrap()).unwrap();

        let orchestrator = CacheOrchestrator::new(&SearchConfig::default())
            .with_tier(Arc::new(StaticFileCache::new(dir.path())))
            .with_tier(memory());

        let hit = orchestrator.lookup("Bread", &[], false).await.unwrap();
        assert_eq!(hit.meta.cache_source, CacheSource::Static);
        assert_eq!(hit.cached.result.stats.estimated_total_hits, 77);

        let filters = vec!["season = \"s01\"".to_string()];
        assert!(orchestrator.lookup("bread", &filters, false).await.is_none());
        assert!(orchestrator.lookup("bread", &[], true).await.is_none());
    }

    #[tokio::test]
    async fn test_store_skips_read_only_tiers() {
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = CacheOrchestrator::new(&SearchConfig::default())
            .with_tier(Arc::new(StaticFileCache::new(dir.path())))
            .with_tier(memory());

        assert_eq!(orchestrator.store("not popular", &[], false, result(1)).await, 1);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let orchestrator = CacheOrchestrator::new(&SearchConfig::default()).with_tier(memory());
        orchestrator.store("first query", &[], false, result(1)).await;
        orchestrator.store("second query", &[], false, result(1)).await;

        orchestrator.invalidate("first query", &[], false).await;
        assert!(orchestrator.lookup("first query", &[], false).await.is_none());
        assert!(orchestrator.lookup("second query", &[], false).await.is_some());

        orchestrator.clear().await;
        assert!(orchestrator.lookup("second query", &[], false).await.is_none());
    }

    #[tokio::test]
    async fn test_from_config_without_backends() {
        let orchestrator = CacheOrchestrator::from_config(&SearchConfig::default()).await;
        assert_eq!(orchestrator.sources(), vec![CacheSource::Memory]);
    }
}
