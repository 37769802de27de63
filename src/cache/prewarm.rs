// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Out-of-band generator for the static tier.
//!
//! Runs each popular query against the backend (first page, no filters) and
//! writes `<slug>.json` plus a `manifest.json` summary. A query that fails is
//! recorded in the manifest and the run carries on.
//!
//! Never called from the request path.

use std::path::PathBuf;
use tracing::{info, warn};

use super::entry::{now_millis, CachedResult, CachedSearch};
use super::keys::static_file_name;
use super::static_files::{ManifestEntry, ManifestStats, StaticManifest, MANIFEST_FILE};
use super::traits::CacheError;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::metrics;
use crate::query::{QueryBuilder, QueryParser, QueryValidator};
use crate::resilience::retry::{retry, RetryConfig};
use crate::search::{CacheMeta, FacetAggregator, SearchBackend, SearchParams, SearchStats};

pub const MANIFEST_VERSION: &str = "1";

pub struct StaticCacheWriter {
    dir: PathBuf,
    ttl_ms: u64,
    page_size: usize,
    validator: QueryValidator,
    facets: FacetAggregator,
    retry: RetryConfig,
}

impl StaticCacheWriter {
    pub fn new(dir: impl Into<PathBuf>, config: &SearchConfig) -> Self {
        Self {
            dir: dir.into(),
            ttl_ms: config.static_ttl_ms,
            page_size: config.default_page_size,
            validator: QueryValidator::from_config(config),
            facets: FacetAggregator::new(config.facet_limit),
            retry: RetryConfig::prewarm(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Generate one file per query and the manifest.
    pub async fn generate(
        &self,
        backend: &dyn SearchBackend,
        queries: &[String],
    ) -> Result<StaticManifest, CacheError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| CacheError::Io(e.to_string()))?;

        let mut entries = Vec::with_capacity(queries.len());
        let mut stats = ManifestStats {
            total: queries.len(),
            ..Default::default()
        };

        for query in queries {
            // Same normalization as the request path
            let file_name = static_file_name(&self.validator.sanitize(query));
            let entry = match self.warm_one(backend, query, &file_name).await {
                Ok((hit_count, total_hits)) => {
                    stats.cached += 1;
                    stats.total_hits += total_hits;
                    metrics::record_prewarm("cached");
                    ManifestEntry {
                        query: query.clone(),
                        file_name,
                        hit_count,
                        total_hits,
                        cached: true,
                        error: None,
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    metrics::record_prewarm("failed");
                    warn!(query = %query, error = %e, "Pre-warm failed");
                    ManifestEntry {
                        query: query.clone(),
                        file_name,
                        hit_count: 0,
                        total_hits: 0,
                        cached: false,
                        error: Some(e),
                    }
                }
            };
            entries.push(entry);
        }

        let manifest = StaticManifest {
            generated: now_millis(),
            version: MANIFEST_VERSION.to_string(),
            queries: entries,
            stats,
        };

        let bytes = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        tokio::fs::write(self.dir.join(MANIFEST_FILE), bytes)
            .await
            .map_err(|e| CacheError::Io(e.to_string()))?;

        info!(
            dir = %self.dir.display(),
            cached = manifest.stats.cached,
            failed = manifest.stats.failed,
            "Static cache generated"
        );
        Ok(manifest)
    }

    /// Returns (hits written, estimated total) or a message for the manifest.
    async fn warm_one(
        &self,
        backend: &dyn SearchBackend,
        query: &str,
        file_name: &str,
    ) -> Result<(usize, u64), String> {
        let validation = self.validator.validate_query(query);
        if !validation.valid {
            return Err(validation.error.unwrap_or_else(|| "invalid query".to_string()));
        }

        let sanitized = self.validator.sanitize(query);
        let params = SearchParams {
            query: QueryBuilder::build(&QueryParser::parse(&sanitized)),
            original_query: sanitized.clone(),
            filter: Vec::new(),
            offset: 0,
            limit: self.page_size,
            edited_only: false,
        };

        let params = &params;
        let response = retry("prewarm_search", &self.retry, move || async move {
            backend.search(params).await.map_err(SearchError::from)
        })
        .await
        .map_err(|e| e.to_string())?;

        let hit_count = response.hits.len();
        let total_hits = response.estimated_total_hits;
        let stats = SearchStats {
            estimated_total_hits: total_hits,
            processing_time_ms: response.processing_time_ms,
            facets: self.facets.aggregate_rows(&response.facets),
            cache: Some(CacheMeta::miss()),
        };
        let cached = CachedSearch::new(
            sanitized,
            CachedResult {
                has_more: (hit_count as u64) < total_hits,
                hits: response.hits,
                stats,
            },
            self.ttl_ms,
        );

        let bytes = serde_json::to_vec(&cached).map_err(|e| e.to_string())?;
        tokio::fs::write(self.dir.join(file_name), bytes)
            .await
            .map_err(|e| e.to_string())?;

        Ok((hit_count, total_hits))
    }
}
