// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the search pipeline.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host process is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `transcript_search_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `tier`: static, edge, memory
//! - `result`: hit, miss, error
//! - `status`: success, error, invalid
//! - `source`: cache, backend

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record a cache tier lookup outcome
pub fn record_cache_lookup(tier: &str, result: &str) {
    counter!(
        "transcript_search_cache_lookups_total",
        "tier" => tier.to_string(),
        "result" => result.to_string()
    )
    .increment(1);
}

/// Record a cache tier write outcome
pub fn record_cache_write(tier: &str, status: &str) {
    counter!(
        "transcript_search_cache_writes_total",
        "tier" => tier.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Set current in-memory tier entry count
pub fn set_memory_cache_entries(count: usize) {
    gauge!("transcript_search_memory_cache_entries").set(count as f64);
}

/// Record a search request outcome
pub fn record_search_request(status: &str) {
    counter!(
        "transcript_search_requests_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record end-to-end search latency, labelled by what served it
pub fn record_search_latency(source: &str, duration: Duration) {
    histogram!(
        "transcript_search_seconds",
        "source" => source.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record backend call latency
pub fn record_backend_latency(duration: Duration) {
    histogram!("transcript_search_backend_seconds").record(duration.as_secs_f64());
}

/// Record number of hits returned in one page
pub fn record_search_results(count: usize) {
    histogram!("transcript_search_results").record(count as f64);
}

/// Record a pre-warm query outcome
pub fn record_prewarm(status: &str) {
    counter!(
        "transcript_search_prewarm_total",
        "status" => status.to_string()
    )
    .increment(1);
}
