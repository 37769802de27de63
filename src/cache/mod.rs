// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Search Result Caching
//!
//! Three interchangeable tiers behind one [`CacheTier`] trait, composed by the
//! [`CacheOrchestrator`] in priority order:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Static   pre-generated files, read-only       │  popular queries only
//! ├──────────────────────────────────────────────┤
//! │ Edge     Redis, SET ... PX ttl, best-effort   │
//! ├──────────────────────────────────────────────┤
//! │ Memory   bounded map, TTL + oldest eviction   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Entry lifecycle: absent → present (set) → expired (TTL elapsed) → absent
//! (evicted on next read or overwritten on next set).

mod entry;
mod keys;
mod memory;
mod orchestrator;
pub mod prewarm;
mod edge;
mod static_files;
mod traits;

pub use entry::{now_millis, CacheEntry, CachedResult, CachedSearch};
pub use keys::{generate_cache_key, slug, static_cache_key, static_file_name};
pub use memory::{MemoryCache, MemoryCacheStats};
pub use orchestrator::{CacheHit, CacheOrchestrator, TierStats};
pub use prewarm::StaticCacheWriter;
pub use edge::RedisEdgeCache;
pub use static_files::{ManifestEntry, ManifestStats, StaticFileCache, StaticManifest, MANIFEST_FILE};
pub use traits::{CacheError, CacheSource, CacheTier};
