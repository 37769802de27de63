//! Integration Tests for the Redis edge tier
//!
//! These tests require a real Redis. They use testcontainers for portability,
//! no external docker-compose required.
//!
//! # Running Tests
//! ```bash
//! # Run all integration tests (requires Docker)
//! cargo test --test redis_integration -- --ignored
//!
//! # Run only failure scenario tests
//! cargo test --test redis_integration failure -- --ignored
//! ```
//!
//! # Test Organization
//! - `happy_*` - Normal operation: set/get, PX expiry, prefixes, clear
//! - `failure_*` - Redis death mid-run, corrupt values

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use testcontainers::{clients::Cli, core::WaitFor, Container, GenericImage};

use transcript_search::cache::{CacheSource, CacheTier, CachedResult, CachedSearch, RedisEdgeCache};
use transcript_search::{
    BackendError, BackendResponse, SearchBackend, SearchConfig, SearchGateway, SearchOptions,
    SearchParams, SearchStats, TranscriptHit,
};

// =============================================================================
// Container Helpers
// =============================================================================

/// Create a Redis container with health check
fn redis_container(docker: &Cli) -> Container<'_, GenericImage> {
    let image = GenericImage::new("redis", "7-alpine")
        .with_exposed_port(6379)
        .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"));
    docker.run(image)
}

fn redis_url(container: &Container<'_, GenericImage>) -> String {
    format!("redis://127.0.0.1:{}", container.get_host_port_ipv4(6379))
}

fn cached(query: &str, ttl_ms: u64) -> CachedSearch {
    CachedSearch::new(
        query,
        CachedResult {
            hits: vec![hit("line-1")],
            stats: SearchStats {
                estimated_total_hits: 1,
                processing_time_ms: 2,
                ..Default::default()
            },
            has_more: false,
        },
        ttl_ms,
    )
}

fn hit(id: &str) -> TranscriptHit {
    TranscriptHit {
        id: id.into(),
        episode_id: "s02e05".into(),
        season: "s02".into(),
        episode: 5,
        speaker: None,
        line: "the ghost took the bread".into(),
        start_time: Some(93.5),
        edited: true,
    }
}

struct OneHitBackend;

#[async_trait]
impl SearchBackend for OneHitBackend {
    async fn search(&self, _params: &SearchParams) -> Result<BackendResponse, BackendError> {
        Ok(BackendResponse {
            hits: vec![hit("line-1")],
            estimated_total_hits: 1,
            processing_time_ms: 2,
            facets: vec![],
        })
    }
}

// =============================================================================
// Happy Path Tests - Normal Operation
// =============================================================================

#[tokio::test]
#[ignore] // Requires Docker
async fn happy_set_get_delete_round_trip() {
    let docker = Cli::default();
    let redis = redis_container(&docker);

    let edge = RedisEdgeCache::connect(&redis_url(&redis), Some("test:"), 60_000)
        .await
        .expect("Failed to connect to Redis");
    assert_eq!(edge.source(), CacheSource::Edge);
    assert!(!edge.is_read_only());

    let value = cached("haunted house", 60_000);
    edge.set("search:haunted-house", &value, None).await.unwrap();

    let back = edge.get("search:haunted-house").await.unwrap().expect("missing value");
    assert_eq!(back, value);

    edge.delete("search:haunted-house").await.unwrap();
    assert!(edge.get("search:haunted-house").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn happy_px_expiry_removes_key() {
    let docker = Cli::default();
    let redis = redis_container(&docker);
    let url = redis_url(&redis);

    let edge = RedisEdgeCache::connect(&url, None, 60_000).await.unwrap();
    edge.set("search:short", &cached("short", 60_000), Some(100)).await.unwrap();

    // Key carries a Redis-side TTL
    let client = redis::Client::open(url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let pttl: i64 = conn.pttl("search:short").await.unwrap();
    assert!(pttl > 0 && pttl <= 100);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(edge.get("search:short").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn happy_clear_only_touches_own_prefix() {
    let docker = Cli::default();
    let redis = redis_container(&docker);
    let url = redis_url(&redis);

    let ours = RedisEdgeCache::connect(&url, Some("a:"), 60_000).await.unwrap();
    let theirs = RedisEdgeCache::connect(&url, Some("b:"), 60_000).await.unwrap();

    for i in 0..20 {
        let key = format!("search:q{i}");
        ours.set(&key, &cached("q", 60_000), None).await.unwrap();
        theirs.set(&key, &cached("q", 60_000), None).await.unwrap();
    }

    let client = redis::Client::open(url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: () = conn.set("a:unrelated", "keep").await.unwrap();

    ours.clear().await.unwrap();

    assert!(ours.get("search:q0").await.unwrap().is_none());
    assert!(theirs.get("search:q0").await.unwrap().is_some());
    let unrelated: Option<String> = conn.get("a:unrelated").await.unwrap();
    assert_eq!(unrelated.as_deref(), Some("keep"));
}

#[tokio::test]
#[ignore] // Requires Docker
async fn happy_gateway_serves_second_search_from_edge() {
    let docker = Cli::default();
    let redis = redis_container(&docker);

    let config = SearchConfig {
        redis_url: Some(redis_url(&redis)),
        redis_prefix: Some("it:".into()),
        ..Default::default()
    };

    // Two gateways sharing one Redis: the second sees the first one's write
    let writer = SearchGateway::from_config(config.clone(), Arc::new(OneHitBackend)).await;
    writer.search("haunted house", SearchOptions::default()).await.unwrap();

    let reader = SearchGateway::from_config(config, Arc::new(OneHitBackend)).await;
    assert!(reader.cache().sources().contains(&CacheSource::Edge));

    let page = reader.search("haunted house", SearchOptions::default()).await.unwrap();
    let meta = page.stats.cache.unwrap();
    assert!(meta.cache_hit);
    assert_eq!(meta.cache_source, CacheSource::Edge);
    assert_eq!(page.items[0].id, "line-1");
}

// =============================================================================
// Failure Scenario Tests
// =============================================================================

#[tokio::test]
#[ignore] // Requires Docker
async fn failure_corrupt_value_reads_as_miss() {
    let docker = Cli::default();
    let redis = redis_container(&docker);
    let url = redis_url(&redis);

    let edge = RedisEdgeCache::connect(&url, None, 60_000).await.unwrap();

    let client = redis::Client::open(url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();
    let _: () = conn.set("search:broken", "{not json").await.unwrap();

    assert!(edge.get("search:broken").await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Docker
async fn failure_redis_death_degrades_to_miss() {
    let docker = Cli::default();
    let redis = redis_container(&docker);

    let edge = RedisEdgeCache::connect(&redis_url(&redis), None, 60_000).await.unwrap();
    edge.set("search:ghost", &cached("ghost", 60_000), None).await.unwrap();

    drop(redis);
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Reads swallow the failure, writes report it
    assert!(edge.get("search:ghost").await.unwrap().is_none());
    assert!(edge.set("search:ghost", &cached("ghost", 60_000), None).await.is_err());
}

#[tokio::test]
async fn failure_unreachable_redis_is_skipped_at_startup() {
    let config = SearchConfig {
        redis_url: Some("not-a-valid-url".into()),
        ..Default::default()
    };

    let gateway = SearchGateway::from_config(config, Arc::new(OneHitBackend)).await;
    assert_eq!(gateway.cache().sources(), vec![CacheSource::Memory]);

    let page = gateway.search("haunted house", SearchOptions::default()).await.unwrap();
    assert_eq!(page.items.len(), 1);
}
