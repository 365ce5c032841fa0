//! cachefront - cache-aside query fetcher
//!
//! Serves the result of a relational query from a Redis key when present,
//! and otherwise runs the query against PostgreSQL or SQLite, stores the rows
//! under the key with a fixed expiry, and returns them.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, port traits and the error taxonomy
//! - **Service Layer** (`services`): the cache-aside fetcher and payload format
//! - **Adapters** (`adapters`): Redis, in-memory, PostgreSQL and SQLite
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use cachefront::adapters::cache::MemoryStore;
//! use cachefront::adapters::mock::MockSource;
//! use cachefront::{CacheAsideFetcher, CacheKey, QueryResult, QuerySpec};
//!
//! # async fn example() -> Result<(), cachefront::FetchError> {
//! let source = MockSource::returning(QueryResult::from_rows(vec![vec![1_i64.into()]]));
//! let fetcher = CacheAsideFetcher::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(source),
//!     Duration::from_secs(120),
//! );
//! let rows = fetcher
//!     .fetch(&CacheKey::new("answer"), &QuerySpec::new("SELECT 1"))
//!     .await?;
//! assert_eq!(rows.row_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{Collaborator, FetchError, FetchResult};
pub use domain::models::{
    CacheConfig, CacheKey, ColumnValue, Config, LoggingConfig, QueryResult, QuerySpec, Row,
    SourceConfig, StoreConfig,
};
pub use domain::ports::{KeyValueStore, RelationalSource, SourceHandle, StoreHandle};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{CacheAsideFetcher, CacheStatus, Fetched};
