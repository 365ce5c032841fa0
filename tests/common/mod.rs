//! Common test utilities for integration tests
//!
//! Provides shared fixtures used across multiple integration test files.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use cachefront::adapters::cache::MemoryStore;
use cachefront::adapters::mock::{MockSource, MockStore};
use cachefront::{CacheAsideFetcher, KeyValueStore, QueryResult, RelationalSource};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Path for a SQLite database file inside `dir`, and its `sqlite://` URL
pub fn sqlite_url(dir: &Path) -> (PathBuf, String) {
    let path = dir.join("books.db");
    let url = format!("sqlite://{}", path.display());
    (path, url)
}

/// The two-row result used throughout the cache-aside tests
pub fn two_rows() -> QueryResult {
    QueryResult::from_rows(vec![
        vec![1_i64.into(), "a".into()],
        vec![2_i64.into(), "b".into()],
    ])
}

pub fn fetcher(
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn RelationalSource>,
    ttl: Duration,
) -> CacheAsideFetcher {
    CacheAsideFetcher::new(store, source, ttl)
}

/// Counting store and source answering with `result`
pub fn counting_pair(result: QueryResult) -> (Arc<MockStore>, Arc<MockSource>) {
    (
        Arc::new(MockStore::new()),
        Arc::new(MockSource::returning(result)),
    )
}

pub fn memory_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new())
}

/// Setup test logging
///
/// Initializes a tracing subscriber writing through the test harness.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Environment variable naming a throwaway PostgreSQL database
pub const PG_URL_VAR: &str = "CACHEFRONT_TEST_PG_URL";

/// Environment variable naming a throwaway Redis server
pub const REDIS_URL_VAR: &str = "CACHEFRONT_TEST_REDIS_URL";

/// Read a live-service URL, or explain how to supply it and return `None`
pub fn live_url(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(url) if !url.is_empty() => Some(url),
        _ => {
            eprintln!("Skipping live test: {var} not set");
            eprintln!("   export {var}=... and run with: cargo test -- --ignored");
            None
        }
    }
}

/// Key unique to one test run, so parallel runs never share entries
pub fn unique_key(prefix: &str) -> cachefront::CacheKey {
    cachefront::CacheKey::new(format!("cachefront-test:{prefix}:{}", uuid::Uuid::new_v4()))
}
