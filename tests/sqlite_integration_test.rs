//! End-to-end fetches against a real SQLite file and the in-memory store.

mod common;

use std::time::Duration;

use cachefront::adapters::build_source;
use cachefront::adapters::cache::MemoryStore;
use cachefront::{
    CacheAsideFetcher, CacheKey, CacheStatus, ColumnValue, FetchError, QuerySpec, SourceConfig,
};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection, Executor};
use std::str::FromStr;
use std::sync::Arc;

async fn seed_books(url: &str) {
    let mut conn = SqliteConnectOptions::from_str(url)
        .unwrap()
        .create_if_missing(true)
        .connect()
        .await
        .unwrap();
    conn.execute(
        "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT NOT NULL, rating REAL, in_print BOOLEAN)",
    )
    .await
    .unwrap();
    conn.execute(
        "INSERT INTO books VALUES (1, 'Dune', 4.5, 1), (2, 'Solaris', NULL, 0)",
    )
    .await
    .unwrap();
    conn.close().await.unwrap();
}

fn source_config(url: &str) -> SourceConfig {
    SourceConfig {
        url: Some(url.to_string()),
        ..SourceConfig::default()
    }
}

#[tokio::test]
async fn test_sqlite_miss_then_hit() {
    let dir = common::temp_dir();
    let (_path, url) = common::sqlite_url(dir.path());
    seed_books(&url).await;

    let store = Arc::new(MemoryStore::new());
    let fetcher = CacheAsideFetcher::new(
        store.clone(),
        build_source(&source_config(&url)).unwrap(),
        Duration::from_secs(120),
    );
    let key = CacheKey::new("books:all");
    let query = QuerySpec::new("SELECT id, title, rating, in_print FROM books ORDER BY id");

    let miss = fetcher.fetch_with_status(&key, &query).await.unwrap();
    assert_eq!(miss.status, CacheStatus::Miss);
    assert_eq!(miss.result.columns, vec!["id", "title", "rating", "in_print"]);
    assert_eq!(
        miss.result.rows,
        vec![
            vec![
                ColumnValue::Integer(1),
                ColumnValue::Text("Dune".into()),
                ColumnValue::Float(4.5),
                ColumnValue::Boolean(true),
            ],
            vec![
                ColumnValue::Integer(2),
                ColumnValue::Text("Solaris".into()),
                ColumnValue::Null,
                ColumnValue::Boolean(false),
            ],
        ]
    );
    assert!(store.contains(&key).await);

    let hit = fetcher.fetch_with_status(&key, &query).await.unwrap();
    assert_eq!(hit.status, CacheStatus::Hit);
    assert_eq!(hit.result, miss.result);
}

#[tokio::test]
async fn test_sqlite_hit_survives_source_change() {
    let dir = common::temp_dir();
    let (_path, url) = common::sqlite_url(dir.path());
    seed_books(&url).await;

    let fetcher = CacheAsideFetcher::new(
        Arc::new(MemoryStore::new()),
        build_source(&source_config(&url)).unwrap(),
        Duration::from_secs(120),
    );
    let key = CacheKey::new("books:count");
    let query = QuerySpec::new("SELECT COUNT(*) AS n FROM books");

    let before = fetcher.fetch(&key, &query).await.unwrap();

    let mut conn = SqliteConnectOptions::from_str(&url).unwrap().connect().await.unwrap();
    conn.execute("INSERT INTO books VALUES (3, 'Roadside Picnic', 4.0, 1)")
        .await
        .unwrap();
    conn.close().await.unwrap();

    // Stale until expiry
    let after = fetcher.fetch(&key, &query).await.unwrap();
    assert_eq!(after, before);
    assert_eq!(after.rows, vec![vec![ColumnValue::Integer(2)]]);
}

#[tokio::test]
async fn test_sqlite_bound_params_and_derived_key() {
    let dir = common::temp_dir();
    let (_path, url) = common::sqlite_url(dir.path());
    seed_books(&url).await;

    let fetcher = CacheAsideFetcher::new(
        Arc::new(MemoryStore::new()),
        build_source(&source_config(&url)).unwrap(),
        Duration::from_secs(120),
    );
    let query = QuerySpec::with_params(
        "SELECT title FROM books WHERE id = ?1",
        vec![ColumnValue::parse_param("2")],
    );

    let result = fetcher.fetch(&CacheKey::derive(&query), &query).await.unwrap();
    assert_eq!(result.rows, vec![vec![ColumnValue::Text("Solaris".into())]]);
}

#[tokio::test]
async fn test_sqlite_bad_query_is_execution_error() {
    let dir = common::temp_dir();
    let (_path, url) = common::sqlite_url(dir.path());
    seed_books(&url).await;

    let store = Arc::new(MemoryStore::new());
    let fetcher = CacheAsideFetcher::new(
        store.clone(),
        build_source(&source_config(&url)).unwrap(),
        Duration::from_secs(120),
    );
    let key = CacheKey::new("broken");

    let err = fetcher
        .fetch(&key, &QuerySpec::new("SELECT nope FROM books"))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Execution(_)));
    assert!(!store.contains(&key).await);
}

#[tokio::test]
async fn test_sqlite_missing_file_is_connection_error() {
    let dir = common::temp_dir();
    let (_path, url) = common::sqlite_url(dir.path());

    let fetcher = CacheAsideFetcher::new(
        Arc::new(MemoryStore::new()),
        build_source(&source_config(&url)).unwrap(),
        Duration::from_secs(120),
    );
    let err = fetcher
        .fetch(&CacheKey::new("k"), &QuerySpec::new("SELECT 1"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "connection");
}
