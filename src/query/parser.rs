// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Parser - tokenizes free-text search input
//!
//! Recognized syntax:
//!
//! ```text
//! word              - plain term
//! "two words"       - exact phrase (unterminated quote closes at end of input)
//! -word             - excluded term
//! -"two words"      - excluded phrase
//! ```
//!
//! The scan is an explicit character walk rather than a regex cascade: the `-`
//! prefix and quoting interact positionally, and the boundary rules below are
//! what callers depend on.
//!
//! # Example
//!
//! ```rust
//! use transcript_search::query::QueryParser;
//!
//! let parsed = QueryParser::parse(r#"ghost "haunted house" -dream"#);
//! assert_eq!(parsed.terms, vec!["ghost"]);
//! assert_eq!(parsed.exact_phrases, vec!["haunted house"]);
//! assert_eq!(parsed.excluded_terms, vec!["dream"]);
//! ```

use serde::{Deserialize, Serialize};

/// Structured decomposition of a raw query string.
///
/// Each bucket keeps first-occurrence order and keeps duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Plain tokens that must all match
    pub terms: Vec<String>,
    /// Phrases that must appear contiguously
    pub exact_phrases: Vec<String>,
    /// Tokens that must not appear
    pub excluded_terms: Vec<String>,
    /// Phrases that must not appear
    pub excluded_phrases: Vec<String>,
}

impl ParsedQuery {
    /// True when no bucket holds anything
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
            && self.exact_phrases.is_empty()
            && self.excluded_terms.is_empty()
            && self.excluded_phrases.is_empty()
    }

    /// True when the query carries any exclusion
    #[must_use]
    pub fn has_exclusions(&self) -> bool {
        !self.excluded_terms.is_empty() || !self.excluded_phrases.is_empty()
    }
}

/// A single token as seen by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Term(String),
    Phrase(String),
}

/// Query parser
pub struct QueryParser;

impl QueryParser {
    /// Parse a raw query string into its four buckets.
    pub fn parse(raw: &str) -> ParsedQuery {
        let chars: Vec<char> = raw.chars().collect();
        let mut parsed = ParsedQuery::default();
        let mut pos = 0;

        while pos < chars.len() {
            if chars[pos] == ' ' {
                pos += 1;
                continue;
            }

            let excluded = chars[pos] == '-';
            if excluded {
                pos += 1;
            }

            let (token, next) = Self::read_token(&chars, pos);
            pos = next;

            match (token, excluded) {
                (Some(Token::Term(t)), false) => parsed.terms.push(t),
                (Some(Token::Phrase(p)), false) => parsed.exact_phrases.push(p),
                (Some(Token::Term(t)), true) => parsed.excluded_terms.push(t),
                (Some(Token::Phrase(p)), true) => parsed.excluded_phrases.push(p),
                // Bare `-` or empty quotes
                (None, _) => {}
            }
        }

        parsed
    }

    /// Read one token starting at `pos`. Returns the token (if any) and the
    /// position just past it.
    fn read_token(chars: &[char], pos: usize) -> (Option<Token>, usize) {
        if pos >= chars.len() || chars[pos] == ' ' {
            return (None, pos);
        }

        if chars[pos] == '"' {
            let start = pos + 1;
            let mut end = start;
            while end < chars.len() && chars[end] != '"' {
                end += 1;
            }
            let phrase: String = chars[start..end].iter().collect();
            // Skip the closing quote when present
            let next = if end < chars.len() { end + 1 } else { end };
            let phrase = phrase.trim();
            if phrase.is_empty() {
                return (None, next);
            }
            return (Some(Token::Phrase(phrase.to_string())), next);
        }

        let mut end = pos;
        while end < chars.len() && chars[end] != ' ' {
            end += 1;
        }
        let term: String = chars[pos..end].iter().collect();
        (Some(Token::Term(term)), end)
    }
}
