// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Request, result and statistics types shared across the pipeline.

use serde::{Deserialize, Serialize};

use crate::cache::CacheSource;

/// One transcript line returned by the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptHit {
    /// Line identifier
    pub id: String,
    /// Episode identifier (e.g., "s01e04")
    pub episode_id: String,
    /// Season code (e.g., "s01")
    pub season: String,
    /// Episode number within the season
    pub episode: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    /// Transcript text of the line
    pub line: String,
    /// Offset into the episode audio, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    /// Whether a contributor has corrected this line
    #[serde(default)]
    pub edited: bool,
}

/// Normalized request handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Backend-ready query string (built from the parsed query)
    pub query: String,
    /// Sanitized user query, used for display and cache keys
    pub original_query: String,
    /// Raw filter expressions (e.g., `season = "s01"`), OR-combined by the backend
    pub filter: Vec<String>,
    /// Start position of the result window
    pub offset: usize,
    /// Size of the result window
    pub limit: usize,
    /// Restrict to edited lines (AND-combined with the filter set)
    pub edited_only: bool,
}

/// Caller-facing request options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub filter: Vec<String>,
    /// Start position; 0 means "first page" and enables caching
    pub offset: usize,
    /// Page size; `None` uses the configured default
    pub limit: Option<usize>,
    pub edited_only: bool,
}

impl SearchOptions {
    #[must_use]
    pub fn with_filter(mut self, filter: Vec<String>) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn edited_only(mut self, edited_only: bool) -> Self {
        self.edited_only = edited_only;
        self
    }

    /// True when no filter or edited-only restriction is active
    #[must_use]
    pub fn is_unfiltered(&self) -> bool {
        self.filter.is_empty() && !self.edited_only
    }
}

/// Raw facet tuple as produced by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetRow {
    pub facet_type: String,
    pub facet_value: String,
    pub count: u64,
}

impl FacetRow {
    pub fn new(facet_type: impl Into<String>, facet_value: impl Into<String>, count: u64) -> Self {
        Self {
            facet_type: facet_type.into(),
            facet_value: facet_value.into(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetHit {
    pub ep: String,
    pub hits: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFacet {
    pub facet_name: String,
    pub facet_hits: Vec<FacetHit>,
}

/// Cache observability attached to a result after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheMeta {
    pub cache_hit: bool,
    pub cache_source: CacheSource,
    pub cache_response_time_ms: u64,
}

impl CacheMeta {
    #[must_use]
    pub fn miss() -> Self {
        Self {
            cache_hit: false,
            cache_source: CacheSource::None,
            cache_response_time_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub estimated_total_hits: u64,
    pub processing_time_ms: u64,
    #[serde(default)]
    pub facets: Vec<SearchFacet>,
    /// Never persisted
    #[serde(skip)]
    pub cache: Option<CacheMeta>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub items: Vec<TranscriptHit>,
    pub total: u64,
    /// 1-based page number derived from offset and limit
    pub page: usize,
    pub limit: usize,
    pub has_more: bool,
    pub stats: SearchStats,
}

/// Result of a pagination continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchMoreResult {
    /// Accumulated hits (previous pages plus the new one)
    pub hits: Vec<TranscriptHit>,
    pub has_more: bool,
    pub stats: SearchStats,
}
