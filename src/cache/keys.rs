// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cache key derivation.
//!
//! ```text
//! slug("Ghost Town!")                         → ghost-town
//! static file                                 → ghost-town.json
//! edge/memory key                             → search:ghost-town
//!   + filters ["b", "a"]                      → search:ghost-town:a,b
//!   + edited only                             → search:ghost-town:a,b:edited
//! ```
//!
//! Filters are sorted before joining, so insertion order never changes the key.

/// Lowercase, collapse non-alphanumeric runs to `-`, strip edge dashes.
pub fn slug(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    let mut pending_dash = false;

    for c in query.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }

    out
}

/// Key for the static tier (the file stem).
pub fn static_cache_key(query: &str) -> String {
    slug(query)
}

/// File name a static entry lives under.
pub fn static_file_name(query: &str) -> String {
    format!("{}.json", slug(query))
}

/// Composite key for the edge and memory tiers.
pub fn generate_cache_key(query: &str, filters: &[String], edited_only: bool) -> String {
    let mut key = format!("search:{}", slug(query));

    if !filters.is_empty() {
        let mut sorted: Vec<&str> = filters.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        key.push(':');
        key.push_str(&sorted.join(","));
    }

    if edited_only {
        key.push_str(":edited");
    }

    key
}
