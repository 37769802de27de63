// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Query Handling
//!
//! Turns user input into a backend query string.
//!
//! # Pipeline
//!
//! ```text
//! raw input
//!     ↓ QueryValidator::validate_query   (reject empty / oversized)
//!     ↓ QueryValidator::sanitize         (strip <>"'&, collapse, truncate)
//!     ↓ QueryParser::parse               → ParsedQuery
//!     ↓ QueryBuilder::build              → backend query string
//! ```

mod builder;
mod parser;
mod validator;

pub use builder::QueryBuilder;
pub use parser::{ParsedQuery, QueryParser};
pub use validator::{
    sanitize_search_query, validate_search_params, validate_search_query, QueryValidator,
    ValidationResult,
};
