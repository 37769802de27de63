// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cache entry representations.
//!
//! Two shapes with two different expiry rules:
//!
//! - [`CacheEntry`]: in-memory, relative TTL → expired when `now - timestamp > ttl`
//! - [`CachedSearch`]: persisted (static files, edge store), absolute instant →
//!   expired when `now > expires_at`

use serde::{Deserialize, Serialize};

use crate::search::{SearchStats, TranscriptHit};

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// In-memory entry with a relative TTL.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: T,
    /// Insertion time (epoch ms)
    pub timestamp: u64,
    pub ttl_ms: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, ttl_ms: u64) -> Self {
        Self {
            data,
            timestamp: now_millis(),
            ttl_ms,
        }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: u64) -> bool {
        now.saturating_sub(self.timestamp) > self.ttl_ms
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }
}

/// The cached part of a search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedResult {
    pub hits: Vec<TranscriptHit>,
    pub stats: SearchStats,
    pub has_more: bool,
}

/// Persisted cache document (static file / edge value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedSearch {
    pub query: String,
    /// Creation time (epoch ms)
    pub timestamp: u64,
    /// Absolute expiry (epoch ms)
    pub expires_at: u64,
    pub result: CachedResult,
}

impl CachedSearch {
    pub fn new(query: impl Into<String>, result: CachedResult, ttl_ms: u64) -> Self {
        let timestamp = now_millis();
        Self {
            query: query.into(),
            timestamp,
            expires_at: timestamp.saturating_add(ttl_ms),
            result,
        }
    }

    #[must_use]
    pub fn is_expired_at(&self, now: u64) -> bool {
        now > self.expires_at
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_millis())
    }
}
