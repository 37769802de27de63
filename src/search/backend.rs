// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Full-text search backend seam.
//!
//! The backend is an opaque provider (a database full-text RPC in production).
//! It must understand the builder's grammar (`term`, `"phrase"`, `-term`,
//! `-"phrase"`), OR-combine the filter expressions, AND the edited-only
//! predicate against them, and honor the `offset`/`limit` window.
//!
//! Timeouts belong to the transport and surface as
//! [`BackendError::Unavailable`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::types::{FacetRow, SearchParams, TranscriptHit};
use crate::error::BackendError;

/// Raw backend response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendResponse {
    pub hits: Vec<TranscriptHit>,
    pub estimated_total_hits: u64,
    pub processing_time_ms: u64,
    /// Per-document facet tags, one row per (type, value)
    #[serde(default)]
    pub facets: Vec<FacetRow>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, params: &SearchParams) -> Result<BackendResponse, BackendError>;
}
