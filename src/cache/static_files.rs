// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Static file cache tier.
//!
//! Read-only at request time. Files are produced out of band by
//! [`super::prewarm::StaticCacheWriter`], one `<slug>.json` per popular query,
//! next to a `manifest.json`:
//!
//! ```text
//! static_dir/
//!   manifest.json
//!   bread.json
//!   haunted-house.json
//! ```
//!
//! Parsed files are memoized per modification time, so a pre-warm run that
//! rewrites the directory is picked up without a restart. Expiry is still
//! checked on every read against the file's absolute `expiresAt`.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

use super::entry::{now_millis, CachedSearch};
use super::traits::{CacheError, CacheSource, CacheTier};

pub const MANIFEST_FILE: &str = "manifest.json";

/// One line of the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub query: String,
    pub file_name: String,
    pub hit_count: usize,
    pub total_hits: u64,
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestStats {
    pub total: usize,
    pub cached: usize,
    pub failed: usize,
    pub total_hits: u64,
}

/// Operational summary of a pre-warm run. Not read by the request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticManifest {
    /// Generation time (epoch ms)
    pub generated: u64,
    pub version: String,
    pub queries: Vec<ManifestEntry>,
    pub stats: ManifestStats,
}

struct Loaded {
    modified: SystemTime,
    cached: CachedSearch,
}

pub struct StaticFileCache {
    dir: PathBuf,
    loaded: DashMap<String, Loaded>,
}

impl StaticFileCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            loaded: DashMap::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read the manifest written by the last pre-warm run.
    pub async fn manifest(&self) -> Result<Option<StaticManifest>, CacheError> {
        let path = self.dir.join(MANIFEST_FILE);
        match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| CacheError::Serialization(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(e.to_string())),
        }
    }

    /// Keys are slugs; anything else cannot name a file in this directory.
    fn is_slug(key: &str) -> bool {
        !key.is_empty() && key.chars().all(|c| c.is_alphanumeric() || c == '-')
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Modification time of the file behind `key`, `None` if absent.
    async fn modified(&self, key: &str) -> Result<Option<SystemTime>, CacheError> {
        let path = self.path_for(key);
        match tokio::fs::metadata(&path).await {
            Ok(meta) => meta
                .modified()
                .map(Some)
                .map_err(|e| CacheError::Io(format!("{}: {}", path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(format!("{}: {}", path.display(), e))),
        }
    }

    async fn load(&self, key: &str) -> Result<Option<CachedSearch>, CacheError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let cached: CachedSearch = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Serialization(format!("{}: {}", path.display(), e)))?;
                Ok(Some(cached))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(format!("{}: {}", path.display(), e))),
        }
    }
}

#[async_trait]
impl CacheTier for StaticFileCache {
    fn source(&self) -> CacheSource {
        CacheSource::Static
    }

    fn is_read_only(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<CachedSearch>, CacheError> {
        if !Self::is_slug(key) {
            return Ok(None);
        }

        let Some(modified) = self.modified(key).await? else {
            self.loaded.remove(key);
            return Ok(None);
        };

        let memoized = self
            .loaded
            .get(key)
            .filter(|entry| entry.modified == modified)
            .map(|entry| entry.cached.clone());
        let cached = match memoized {
            Some(cached) => cached,
            None => match self.load(key).await? {
                Some(cached) => {
                    debug!(key = %key, "Static cache file (re)loaded");
                    self.loaded.insert(
                        key.to_string(),
                        Loaded {
                            modified,
                            cached: cached.clone(),
                        },
                    );
                    cached
                }
                None => {
                    self.loaded.remove(key);
                    return Ok(None);
                }
            },
        };

        if cached.is_expired_at(now_millis()) {
            debug!(key = %key, expires_at = cached.expires_at, "Static cache entry expired");
            self.loaded.remove(key);
            return Ok(None);
        }

        Ok(Some(cached))
    }

    async fn set(&self, _key: &str, _value: &CachedSearch, _ttl_ms: Option<u64>) -> Result<(), CacheError> {
        Err(CacheError::ReadOnly("static"))
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::ReadOnly("static"))
    }

    async fn clear(&self) -> Result<(), CacheError> {
        Err(CacheError::ReadOnly("static"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CachedResult;
    use crate::search::SearchStats;

    fn write_entry(dir: &Path, slug: &str, expires_at: u64) {
        write_entry_with_total(dir, slug, expires_at, 42);
    }

    fn write_entry_with_total(dir: &Path, slug: &str, expires_at: u64, total: u64) {
        let cached = CachedSearch {
            query: slug.to_string(),
            timestamp: 1,
            expires_at,
            result: CachedResult {
                hits: vec![],
                stats: SearchStats {
                    estimated_total_hits: total,
                    ..Default::default()
                },
                has_more: true,
            },
        };
        std::fs::write(
            dir.join(format!("{}.json", slug)),
            serde_json::to_vec(&cached).unwrap(),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_reads_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        write_entry(dir.path(), "bread", u64::MAX);

        let cache = StaticFileCache::new(dir.path());
        let hit = cache.get("bread").await.unwrap().unwrap();
        assert_eq!(hit.result.stats.estimated_total_hits, 42);
        assert!(hit.result.has_more);
    }

    #[tokio::test]
    async fn test_rewritten_file_is_reloaded() {
        let dir = tempfile::tempdir().unwrap();
        write_entry_with_total(dir.path(), "bread", u64::MAX, 42);

        let cache = StaticFileCache::new(dir.path());
        let first = cache.get("bread").await.unwrap().unwrap();
        assert_eq!(first.result.stats.estimated_total_hits, 42);

        // A later pre-warm run rewrites the file
        write_entry_with_total(dir.path(), "bread", u64::MAX, 77);
        std::fs::File::options()
            .write(true)
            .open(dir.path().join("bread.json"))
            .unwrap()
            .set_modified(SystemTime::now() + std::time::Duration::from_secs(60))
            .unwrap();

        let second = cache.get("bread").await.unwrap().unwrap();
        assert_eq!(second.result.stats.estimated_total_hits, 77);

        // And removes it
        std::fs::remove_file(dir.path().join("bread.json")).unwrap();
        assert!(cache.get("bread").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StaticFileCache::new(dir.path());
        assert!(cache.get("nothing-here").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_file_is_miss() {
        let dir = tempfile::tempdir().unwrap();
        write_entry(dir.path(), "ghost", 10);

        let cache = StaticFileCache::new(dir.path());
        assert!(cache.get("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("pizza.json"), b"{not json").unwrap();

        let cache = StaticFileCache::new(dir.path());
        let err = cache.get("pizza").await.unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_non_slug_keys_never_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StaticFileCache::new(dir.path());
        assert!(cache.get("../manifest").await.unwrap().is_none());
        assert!(cache.get("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_writes_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StaticFileCache::new(dir.path());
        let cached = CachedSearch::new(
            "x",
            CachedResult { hits: vec![], stats: SearchStats::default(), has_more: false },
            1000,
        );

        assert_eq!(cache.set("x", &cached, None).await, Err(CacheError::ReadOnly("static")));
        assert_eq!(cache.delete("x").await, Err(CacheError::ReadOnly("static")));
        assert_eq!(cache.clear().await, Err(CacheError::ReadOnly("static")));
        assert!(cache.is_read_only());
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StaticFileCache::new(dir.path());
        assert!(cache.manifest().await.unwrap().is_none());
    }
}
