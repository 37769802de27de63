// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Builder - serializes a [`ParsedQuery`] into backend query syntax
//!
//! Output order is fixed so the same structure always yields the same string:
//!
//! ```text
//! terms  "phrases"  -excluded  -"excluded phrases"
//! ```
//!
//! The backend grammar is order-insensitive, so the reordering never changes
//! which documents match.

use super::parser::ParsedQuery;

/// Backend query string builder
pub struct QueryBuilder;

impl QueryBuilder {
    /// Build the backend query string.
    pub fn build(parsed: &ParsedQuery) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(
            parsed.terms.len()
                + parsed.exact_phrases.len()
                + parsed.excluded_terms.len()
                + parsed.excluded_phrases.len(),
        );

        parts.extend(parsed.terms.iter().cloned());
        parts.extend(parsed.exact_phrases.iter().map(|p| format!("\"{}\"", p)));
        parts.extend(parsed.excluded_terms.iter().map(|t| format!("-{}", t)));
        parts.extend(parsed.excluded_phrases.iter().map(|p| format!("-\"{}\"", p)));

        parts.join(" ")
    }
}
