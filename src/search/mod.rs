// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Types, Facets and Backend
//!
//! Everything the gateway exchanges with the full-text backend:
//! [`SearchParams`] going out, [`BackendResponse`] coming back, and the
//! [`FacetAggregator`] that ranks the raw facet tags.

mod backend;
mod facets;
mod types;

pub use backend::{BackendResponse, SearchBackend};
pub use facets::FacetAggregator;
pub use types::{
    CacheMeta, FacetHit, FacetRow, SearchFacet, SearchMoreResult, SearchOptions, SearchPage,
    SearchParams, SearchStats, TranscriptHit,
};
