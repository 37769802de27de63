// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

use async_trait::async_trait;
use thiserror::Error;

use super::entry::CachedSearch;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("{0} cache is read-only")]
    ReadOnly(&'static str),
    #[error("Cache backend error: {0}")]
    Backend(String),
    #[error("Cache serialization error: {0}")]
    Serialization(String),
    #[error("Cache I/O error: {0}")]
    Io(String),
}

/// Which tier served (or did not serve) a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheSource {
    /// Pre-generated files for popular queries
    Static,
    /// Remote key-value store
    Edge,
    /// In-process map
    Memory,
    /// Not served from cache
    None,
}

impl CacheSource {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Edge => "edge",
            Self::Memory => "memory",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for CacheSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common capability of every cache tier.
///
/// `get` treats expired entries as absent. `ttl_ms = None` uses the tier's
/// default lifetime.
#[async_trait]
pub trait CacheTier: Send + Sync {
    fn source(&self) -> CacheSource;

    /// Tiers that refuse writes at request time
    fn is_read_only(&self) -> bool {
        false
    }

    async fn get(&self, key: &str) -> Result<Option<CachedSearch>, CacheError>;
    async fn set(&self, key: &str, value: &CachedSearch, ttl_ms: Option<u64>) -> Result<(), CacheError>;
    async fn delete(&self, key: &str) -> Result<(), CacheError>;
    async fn clear(&self) -> Result<(), CacheError>;
}
