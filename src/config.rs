// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the search pipeline.
//!
//! # Example
//!
//! ```
//! use transcript_search::SearchConfig;
//!
//! // Minimal config (uses defaults)
//! let config = SearchConfig::default();
//! assert_eq!(config.max_query_length, 500);
//! assert_eq!(config.facet_limit, 9);
//!
//! // Full config
//! let config = SearchConfig {
//!     redis_url: Some("redis://localhost:6379".into()),
//!     static_dir: Some("public/cache".into()),
//!     memory_max_entries: 500,
//!     ..Default::default()
//! };
//! ```

use serde::Deserialize;

/// Queries pre-warmed into the static tier by the out-of-band job.
pub const DEFAULT_POPULAR_QUERIES: &[&str] = &[
    "bread",
    "ghost",
    "coffee",
    "pizza",
    "dream",
    "birthday",
    "christmas",
    "halloween",
    "music",
    "movie",
    "television",
    "school",
    "doctor",
    "car",
    "dog",
    "cat",
    "beer",
    "wrestling",
    "cheese",
    "sandwich",
];

/// Configuration for the search pipeline.
///
/// All fields have sensible defaults. Cache backends are optional: without
/// `redis_url` there is no edge tier, without `static_dir` no static tier.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Longest accepted raw query, in characters
    #[serde(default = "default_max_query_length")]
    pub max_query_length: usize,

    /// Largest accepted start offset
    #[serde(default = "default_max_offset")]
    pub max_offset: usize,

    /// Most filter expressions per request
    #[serde(default = "default_max_filters")]
    pub max_filters: usize,

    /// Page size when the caller does not pass one
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Facet values kept per facet
    #[serde(default = "default_facet_limit")]
    pub facet_limit: usize,

    /// Queries must be strictly longer than this (trimmed) to be cached
    #[serde(default = "default_min_cacheable_query_length")]
    pub min_cacheable_query_length: usize,

    /// In-memory tier capacity
    #[serde(default = "default_memory_max_entries")]
    pub memory_max_entries: usize,

    /// In-memory tier TTL
    #[serde(default = "default_memory_ttl_ms")]
    pub memory_ttl_ms: u64,

    /// Edge tier TTL
    #[serde(default = "default_edge_ttl_ms")]
    pub edge_ttl_ms: u64,

    /// Lifetime stamped into pre-warmed static files
    #[serde(default = "default_static_ttl_ms")]
    pub static_ttl_ms: u64,

    /// Redis connection string for the edge tier (e.g., "redis://localhost:6379")
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Key namespace inside Redis (e.g., "transcripts:")
    #[serde(default)]
    pub redis_prefix: Option<String>,

    /// Directory holding the pre-warmed static files
    #[serde(default)]
    pub static_dir: Option<String>,

    /// Curated popular queries served from the static tier
    #[serde(default = "default_popular_queries")]
    pub popular_queries: Vec<String>,
}

fn default_max_query_length() -> usize { 500 }
fn default_max_offset() -> usize { 10_000 }
fn default_max_filters() -> usize { 50 }
fn default_page_size() -> usize { 20 }
fn default_facet_limit() -> usize { 9 }
fn default_min_cacheable_query_length() -> usize { 2 }
fn default_memory_max_entries() -> usize { 1000 }
fn default_memory_ttl_ms() -> u64 { 5 * 60 * 1000 } // 5 minutes
fn default_edge_ttl_ms() -> u64 { 60 * 60 * 1000 } // 1 hour
fn default_static_ttl_ms() -> u64 { 24 * 60 * 60 * 1000 } // 1 day
fn default_popular_queries() -> Vec<String> {
    DEFAULT_POPULAR_QUERIES.iter().map(|q| q.to_string()).collect()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_query_length: default_max_query_length(),
            max_offset: default_max_offset(),
            max_filters: default_max_filters(),
            default_page_size: default_page_size(),
            facet_limit: default_facet_limit(),
            min_cacheable_query_length: default_min_cacheable_query_length(),
            memory_max_entries: default_memory_max_entries(),
            memory_ttl_ms: default_memory_ttl_ms(),
            edge_ttl_ms: default_edge_ttl_ms(),
            static_ttl_ms: default_static_ttl_ms(),
            redis_url: None,
            redis_prefix: None,
            static_dir: None,
            popular_queries: default_popular_queries(),
        }
    }
}
