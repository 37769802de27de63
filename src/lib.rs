//! # Transcript Search
//!
//! Search core for a podcast transcript site: query parsing, validation,
//! facet aggregation and a tiered result cache in front of a pluggable
//! full-text backend.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      SearchGateway                          │
//! │  • validate → sanitize → cache probe → parse/build          │
//! │  • search() and search_more() pagination                    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                  (first page only, offset == 0)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    CacheOrchestrator                        │
//! │  • Static: pre-generated JSON for popular queries           │
//! │  • Edge: Redis with PX expiry, best-effort                  │
//! │  • Memory: bounded map, TTL + oldest-first eviction         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                          (on miss)
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SearchBackend                           │
//! │  • Any full-text engine behind one async trait              │
//! │  • Raw facet rows folded by FacetAggregator                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use transcript_search::{
//!     BackendError, BackendResponse, SearchBackend, SearchConfig, SearchGateway, SearchOptions,
//!     SearchParams,
//! };
//!
//! struct MyEngine;
//!
//! #[async_trait]
//! impl SearchBackend for MyEngine {
//!     async fn search(&self, _params: &SearchParams) -> Result<BackendResponse, BackendError> {
//!         Ok(BackendResponse::default())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SearchConfig {
//!         redis_url: Some("redis://localhost:6379".into()),
//!         ..Default::default()
//!     };
//!     let gateway = SearchGateway::from_config(config, Arc::new(MyEngine)).await;
//!
//!     let page = gateway
//!         .search("\"haunted house\" -dream", SearchOptions::default().with_filter(vec!["season = s02".into()]))
//!         .await
//!         .expect("search failed");
//!     println!("{} of {} hits", page.items.len(), page.total);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`query`]: parser, backend query builder, validator and sanitizer
//! - [`search`]: result types, facet aggregation, the backend trait
//! - [`cache`]: cache tiers, key generation, orchestrator, static pre-warm
//! - [`gateway`]: the [`SearchGateway`] tying it all together
//! - [`resilience`]: retry with backoff for startup and pre-warm
//! - [`metrics`]: counters and histograms via the `metrics` facade

pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod metrics;
pub mod query;
pub mod resilience;
pub mod search;

pub use cache::{
    generate_cache_key, CacheError, CacheOrchestrator, CacheSource, CacheTier, CachedResult,
    CachedSearch, MemoryCache, RedisEdgeCache, StaticCacheWriter, StaticFileCache,
};
pub use config::SearchConfig;
pub use error::{BackendError, SearchError};
pub use gateway::SearchGateway;
pub use query::{ParsedQuery, QueryBuilder, QueryParser, QueryValidator, ValidationResult};
pub use resilience::RetryConfig;
pub use search::{
    BackendResponse, FacetAggregator, FacetHit, FacetRow, SearchBackend, SearchFacet,
    SearchMoreResult, SearchOptions, SearchPage, SearchParams, SearchStats, TranscriptHit,
};
