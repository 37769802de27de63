// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error taxonomy for the search pipeline.
//!
//! Every error leaving [`crate::SearchGateway`] is a [`SearchError`], so callers
//! can branch on the variant instead of inspecting strings:
//!
//! | Variant        | Cause                                  | Retry? | HTTP |
//! |----------------|----------------------------------------|--------|------|
//! | `InvalidQuery` | empty/oversized query, bad params      | no     | 400  |
//! | `Network`      | backend unreachable or non-success     | yes    | 503  |
//! | `Internal`     | anything else, original message kept   | no     | 500  |
//!
//! Cache failures ([`crate::cache::CacheError`]) never show up here: the
//! orchestrator logs them and carries on as a miss / no-op.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("{0}")]
    InvalidQuery(String),
    #[error("Search backend unavailable: {0}")]
    Network(String),
    #[error("Unexpected search failure: {0}")]
    Internal(String),
}

impl SearchError {
    /// Whether the caller may retry the request (with backoff).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// HTTP status class a route handler should map this error to.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidQuery(_) => 400,
            Self::Network(_) => 503,
            Self::Internal(_) => 500,
        }
    }
}

/// Failure reported by a [`crate::search::SearchBackend`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unavailable(String),
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid backend response: {0}")]
    Decode(String),
    #[error("{0}")]
    Other(String),
}

impl From<BackendError> for SearchError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(_) | BackendError::Status { .. } => {
                SearchError::Network(err.to_string())
            }
            BackendError::Decode(msg) | BackendError::Other(msg) => SearchError::Internal(msg),
        }
    }
}
