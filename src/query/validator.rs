// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query validation and sanitization.
//!
//! Validation runs on the raw input and rejects garbage before anything tries
//! to clean it. Sanitization then trims, strips `<>"'&`, collapses whitespace
//! and truncates, producing the text the parser sees.

use crate::config::SearchConfig;
use crate::search::SearchParams;

/// Characters removed by [`QueryValidator::sanitize`]
const UNSAFE_CHARS: &[char] = &['<', '>', '"', '\'', '&'];

/// Outcome of a validation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    #[must_use]
    pub fn ok() -> Self {
        Self { valid: true, error: None }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self { valid: false, error: Some(message.into()) }
    }
}

/// Validator holding the configured limits.
#[derive(Debug, Clone)]
pub struct QueryValidator {
    max_query_length: usize,
    max_offset: usize,
    max_filters: usize,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl QueryValidator {
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_query_length: config.max_query_length,
            max_offset: config.max_offset,
            max_filters: config.max_filters,
        }
    }

    pub fn validate_query(&self, query: &str) -> ValidationResult {
        if query.trim().is_empty() {
            return ValidationResult::fail("Search query cannot be empty");
        }
        if query.chars().count() > self.max_query_length {
            return ValidationResult::fail(format!(
                "Search query is too long (max {} characters)",
                self.max_query_length
            ));
        }
        ValidationResult::ok()
    }

    pub fn validate_params(&self, params: &SearchParams) -> ValidationResult {
        let query = self.validate_query(&params.original_query);
        if !query.valid {
            return query;
        }
        if params.offset > self.max_offset {
            return ValidationResult::fail(format!(
                "Offset must be between 0 and {}",
                self.max_offset
            ));
        }
        if params.filter.len() > self.max_filters {
            return ValidationResult::fail(format!(
                "Too many filters (max {})",
                self.max_filters
            ));
        }
        ValidationResult::ok()
    }

    pub fn sanitize(&self, query: &str) -> String {
        let stripped: String = query
            .trim()
            .chars()
            .filter(|c| !UNSAFE_CHARS.contains(c))
            .collect();
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.chars().take(self.max_query_length).collect()
    }
}

/// [`QueryValidator::validate_query`] with default limits.
pub fn validate_search_query(query: &str) -> ValidationResult {
    QueryValidator::default().validate_query(query)
}

/// [`QueryValidator::validate_params`] with default limits.
pub fn validate_search_params(params: &SearchParams) -> ValidationResult {
    QueryValidator::default().validate_params(params)
}

/// [`QueryValidator::sanitize`] with default limits.
pub fn sanitize_search_query(query: &str) -> String {
    QueryValidator::default().sanitize(query)
}
