// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Redis edge cache tier.
//!
//! Values are JSON-encoded [`CachedSearch`] documents written with
//! `SET key value PX ttl`, so Redis expires them on its own; the absolute
//! `expiresAt` inside the document is checked again on read.
//!
//! Reads are best-effort: a miss, a network error or an undecodable value all
//! come back as `Ok(None)` (errors are logged). Writes report errors as
//! [`CacheError`] and the orchestrator decides what to do with them.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tracing::{debug, warn};

use super::entry::{now_millis, CachedSearch};
use super::traits::{CacheError, CacheSource, CacheTier};
use crate::resilience::retry::{retry, RetryConfig};

/// Keys written by this tier start with this (after the namespace prefix)
const KEY_PATTERN: &str = "search:*";

pub struct RedisEdgeCache {
    connection: ConnectionManager,
    /// Optional key prefix for namespacing (e.g., "transcripts:" → "transcripts:search:bread")
    prefix: String,
    default_ttl_ms: u64,
}

impl RedisEdgeCache {
    /// Connect with the startup retry policy.
    pub async fn connect(
        connection_string: &str,
        prefix: Option<&str>,
        default_ttl_ms: u64,
    ) -> Result<Self, CacheError> {
        let client = Client::open(connection_string)
            .map_err(|e| CacheError::Backend(e.to_string()))?;

        let connection = retry("redis_connect", &RetryConfig::connect(), || {
            ConnectionManager::new(client.clone())
        })
        .await
        .map_err(|e: redis::RedisError| CacheError::Backend(e.to_string()))?;

        Ok(Self {
            connection,
            prefix: prefix.unwrap_or("").to_string(),
            default_ttl_ms,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[inline]
    fn prefixed_key(&self, key: &str) -> String {
        prefixed(&self.prefix, key)
    }

    async fn fetch(&self, key: &str) -> Result<Option<String>, redis::RedisError> {
        let mut conn = self.connection.clone();
        conn.get(self.prefixed_key(key)).await
    }
}

fn prefixed(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}{}", prefix, key)
    }
}

/// Decode a stored value; `None` if malformed or past its `expiresAt`.
fn decode_fresh(key: &str, raw: &str, now: u64) -> Option<CachedSearch> {
    match serde_json::from_str::<CachedSearch>(raw) {
        Ok(cached) if cached.is_expired_at(now) => {
            debug!(key = %key, "Edge cache value past expiresAt");
            None
        }
        Ok(cached) => Some(cached),
        Err(e) => {
            warn!(key = %key, error = %e, "Undecodable edge cache value");
            None
        }
    }
}

#[async_trait]
impl CacheTier for RedisEdgeCache {
    fn source(&self) -> CacheSource {
        CacheSource::Edge
    }

    async fn get(&self, key: &str) -> Result<Option<CachedSearch>, CacheError> {
        match self.fetch(key).await {
            Ok(Some(raw)) => Ok(decode_fresh(key, &raw, now_millis())),
            Ok(None) => Ok(None),
            Err(e) => {
                warn!(key = %key, error = %e, "Edge cache read failed");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &CachedSearch, ttl_ms: Option<u64>) -> Result<(), CacheError> {
        let payload = serde_json::to_string(value)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;
        let ttl = ttl_ms.unwrap_or(self.default_ttl_ms).max(1);
        let mut conn = self.connection.clone();

        let _: () = redis::cmd("SET")
            .arg(self.prefixed_key(key))
            .arg(payload)
            .arg("PX")
            .arg(ttl)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .del(self.prefixed_key(key))
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }

    /// Remove every search key under this tier's prefix (SCAN, not KEYS).
    async fn clear(&self) -> Result<(), CacheError> {
        let pattern = self.prefixed_key(KEY_PATTERN);
        let mut conn = self.connection.clone();
        let mut cursor: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(500)
                .query_async(&mut conn)
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))?;

            if !keys.is_empty() {
                let _: () = conn
                    .del(keys)
                    .await
                    .map_err(|e| CacheError::Backend(e.to_string()))?;
            }

            if next == 0 {
                return Ok(());
            }
            cursor = next;
        }
    }
}
