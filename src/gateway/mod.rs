// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search gateway: the single entry point for transcript search.
//!
//! # Flow
//!
//! ```text
//! search(query, options)
//!       │
//!       ├─→ validate raw query + options     (InvalidQuery, no I/O)
//!       ├─→ sanitize
//!       ├─→ first default-size page? probe   (hit → return, backend skipped)
//!       ├─→ parse → build backend query
//!       ├─→ backend.search(params)           (Network / Internal on failure)
//!       ├─→ aggregate facets
//!       ├─→ first default-size page && should_cache? write through
//!       └─→ SearchPage { items, total, page, limit, has_more, stats }
//! ```
//!
//! Continuation pages (`offset > 0`) and pages with a non-default `limit`
//! never touch the cache. Facets are only meaningful on the first page:
//! callers keep the first page's facets.
//!
//! # Example
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use transcript_search::{SearchConfig, SearchGateway, SearchOptions};
//! # use transcript_search::search::SearchBackend;
//! # async fn example(backend: Arc<dyn SearchBackend>) -> Result<(), transcript_search::SearchError> {
//! let gateway = SearchGateway::from_config(SearchConfig::default(), backend).await;
//!
//! let page = gateway.search("haunted house -dream", SearchOptions::default()).await?;
//! let more = gateway.search_more("haunted house -dream", &page.items, SearchOptions::default()).await?;
//! println!("{} hits so far, more: {}", more.hits.len(), more.has_more);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheHit, CacheOrchestrator, CachedResult};
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::metrics;
use crate::query::{QueryBuilder, QueryParser, QueryValidator};
use crate::search::{
    CacheMeta, FacetAggregator, SearchBackend, SearchMoreResult, SearchOptions, SearchPage,
    SearchParams, SearchStats, TranscriptHit,
};

pub struct SearchGateway {
    config: SearchConfig,
    validator: QueryValidator,
    facets: FacetAggregator,
    cache: Arc<CacheOrchestrator>,
    backend: Arc<dyn SearchBackend>,
}

impl SearchGateway {
    pub fn new(config: SearchConfig, cache: Arc<CacheOrchestrator>, backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            validator: QueryValidator::from_config(&config),
            facets: FacetAggregator::new(config.facet_limit),
            config,
            cache,
            backend,
        }
    }

    /// Build the gateway together with every cache tier the config enables.
    pub async fn from_config(config: SearchConfig, backend: Arc<dyn SearchBackend>) -> Self {
        let cache = Arc::new(CacheOrchestrator::from_config(&config).await);
        Self::new(config, cache, backend)
    }

    pub fn cache(&self) -> &CacheOrchestrator {
        &self.cache
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run one search page.
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<SearchPage, SearchError> {
        let start = Instant::now();
        let result = self.search_inner(query, &options, start).await;

        match &result {
            Ok(page) => {
                metrics::record_search_request("success");
                metrics::record_search_results(page.items.len());
            }
            Err(SearchError::InvalidQuery(_)) => metrics::record_search_request("invalid"),
            Err(e) => {
                metrics::record_search_request("error");
                warn!(query = %query, error = %e, "Search failed");
            }
        }

        result
    }

    async fn search_inner(
        &self,
        query: &str,
        options: &SearchOptions,
        start: Instant,
    ) -> Result<SearchPage, SearchError> {
        let limit = options.limit.unwrap_or(self.config.default_page_size).max(1);

        // 1. Validate before touching anything
        let validation = self.validator.validate_params(&SearchParams {
            query: query.to_string(),
            original_query: query.to_string(),
            filter: options.filter.clone(),
            offset: options.offset,
            limit,
            edited_only: options.edited_only,
        });
        if !validation.valid {
            let message = validation.error.unwrap_or_else(|| "Invalid search query".to_string());
            return Err(SearchError::InvalidQuery(message));
        }

        // 2. Sanitize
        let sanitized = self.validator.sanitize(query);
        if sanitized.is_empty() {
            return Err(SearchError::InvalidQuery("Search query cannot be empty".to_string()));
        }

        // Cached pages always hold `default_page_size` hits
        let cacheable = options.offset == 0 && limit == self.config.default_page_size;

        // 3. First page only: cache probe
        if cacheable {
            if let Some(hit) = self
                .cache
                .lookup(&sanitized, &options.filter, options.edited_only)
                .await
            {
                metrics::record_search_latency("cache", start.elapsed());
                return Ok(Self::page_from_cache(hit, limit));
            }
        }

        // 4. Parse + build
        let parsed = QueryParser::parse(&sanitized);
        let backend_query = QueryBuilder::build(&parsed);

        // 5. Backend call
        let params = SearchParams {
            query: backend_query,
            original_query: sanitized.clone(),
            filter: options.filter.clone(),
            offset: options.offset,
            limit,
            edited_only: options.edited_only,
        };
        debug!(query = %params.query, original = %params.original_query, offset = params.offset, limit, "Querying search backend");

        let backend_start = Instant::now();
        let response = self.backend.search(&params).await?;
        metrics::record_backend_latency(backend_start.elapsed());

        // 6. Facets
        let facets = self.facets.aggregate_rows(&response.facets);

        // 7. Stats
        let stats = SearchStats {
            estimated_total_hits: response.estimated_total_hits,
            processing_time_ms: response.processing_time_ms,
            facets,
            cache: Some(CacheMeta::miss()),
        };
        let has_more = ((options.offset + response.hits.len()) as u64) < response.estimated_total_hits;

        // 8. Write-through (first page only, static tier never written here)
        if cacheable && self.cache.should_cache(&sanitized, &stats) {
            let result = CachedResult {
                hits: response.hits.clone(),
                stats: stats.clone(),
                has_more,
            };
            self.cache
                .store(&sanitized, &options.filter, options.edited_only, result)
                .await;
        }

        info!(
            query = %sanitized,
            hits = response.hits.len(),
            total = response.estimated_total_hits,
            offset = options.offset,
            "Search served by backend"
        );
        metrics::record_search_latency("backend", start.elapsed());

        // 9. Page
        Ok(SearchPage {
            total: response.estimated_total_hits,
            page: options.offset / limit + 1,
            limit,
            has_more,
            items: response.hits,
            stats,
        })
    }

    fn page_from_cache(hit: CacheHit, limit: usize) -> SearchPage {
        let CachedResult { hits, mut stats, has_more } = hit.cached.result;
        stats.cache = Some(hit.meta);
        SearchPage {
            total: stats.estimated_total_hits,
            page: 1,
            limit,
            has_more,
            items: hits,
            stats,
        }
    }

    /// Fetch the page following `current_hits` and append it.
    ///
    /// The next offset is always `current_hits.len()`. Calls must be issued
    /// one after another, each with the previous call's accumulated hits.
    pub async fn search_more(
        &self,
        query: &str,
        current_hits: &[TranscriptHit],
        options: SearchOptions,
    ) -> Result<SearchMoreResult, SearchError> {
        let offset = current_hits.len();
        let page = self.search(query, options.with_offset(offset)).await?;

        let mut hits = Vec::with_capacity(current_hits.len() + page.items.len());
        hits.extend_from_slice(current_hits);
        hits.extend(page.items);

        Ok(SearchMoreResult {
            hits,
            has_more: page.has_more,
            stats: page.stats,
        })
    }
}
