//! Cache-aside fetch: look up the store, fall back to the source on a miss,
//! write the result back with a fixed expiry.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::domain::errors::FetchResult;
use crate::domain::models::{CacheConfig, CacheKey, QueryResult, QuerySpec};
use crate::domain::ports::{KeyValueStore, RelationalSource, SourceHandle, StoreHandle};
use crate::services::wire_format;

/// Which path a fetch took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// Served from the store; the source was not executed.
    Hit,
    /// Executed against the source and written back.
    Miss,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hit => write!(f, "hit"),
            Self::Miss => write!(f, "miss"),
        }
    }
}

/// A fetched result together with the path that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub result: QueryResult,
    pub status: CacheStatus,
}

/// Cache-aside fetcher over a key-value store and a relational source.
///
/// Each call is one linear attempt: acquire the store handle, acquire the
/// source handle, look up, and on a miss execute and write back. Both handles
/// are released before returning, whatever the outcome. Nothing is retried.
pub struct CacheAsideFetcher {
    store: Arc<dyn KeyValueStore>,
    source: Arc<dyn RelationalSource>,
    ttl: Duration,
}

impl CacheAsideFetcher {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn RelationalSource>,
        ttl: Duration,
    ) -> Self {
        Self { store, source, ttl }
    }

    pub fn from_config(
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn RelationalSource>,
        config: &CacheConfig,
    ) -> Self {
        Self::new(store, source, config.ttl())
    }

    /// Expiry applied to entries written on a miss.
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the result associated with `key`, computing it from `query` on a miss.
    pub async fn fetch(&self, key: &CacheKey, query: &QuerySpec) -> FetchResult<QueryResult> {
        self.fetch_with_status(key, query)
            .await
            .map(|fetched| fetched.result)
    }

    /// Like [`fetch`](Self::fetch), also reporting whether the store was hit.
    ///
    /// The store is connected first; if it is unreachable the source is never
    /// attempted. A hit is trusted as-is, with no check that the stored entry
    /// came from `query`.
    #[instrument(skip_all, fields(key = %key))]
    pub async fn fetch_with_status(
        &self,
        key: &CacheKey,
        query: &QuerySpec,
    ) -> FetchResult<Fetched> {
        let mut store = self.store.connect().await?;
        let mut source = match self.source.connect().await {
            Ok(handle) => handle,
            Err(err) => {
                store.close().await;
                return Err(err);
            }
        };

        let outcome = self
            .lookup_or_populate(store.as_mut(), source.as_mut(), key, query)
            .await;

        source.close().await;
        store.close().await;
        debug!("released store and source handles");

        outcome
    }

    async fn lookup_or_populate(
        &self,
        store: &mut dyn StoreHandle,
        source: &mut dyn SourceHandle,
        key: &CacheKey,
        query: &QuerySpec,
    ) -> FetchResult<Fetched> {
        if let Some(payload) = store.get(key).await? {
            let result = wire_format::decode(&payload)?;
            info!(rows = result.row_count(), "loaded data from cache");
            return Ok(Fetched {
                result,
                status: CacheStatus::Hit,
            });
        }

        info!("cache miss; querying relational source");
        let result = source.execute(query).await?;
        let payload = wire_format::encode(&result)?;
        store.set_with_expiry(key, &payload, self.ttl).await?;
        info!(
            rows = result.row_count(),
            ttl_secs = self.ttl.as_secs(),
            "cache updated"
        );

        Ok(Fetched {
            result,
            status: CacheStatus::Miss,
        })
    }
}
