use crate::domain::errors::FetchResult;
use crate::domain::models::CacheKey;
use async_trait::async_trait;
use std::time::Duration;

/// Port for the key-value cache
///
/// Implementations hand out a fresh [`StoreHandle`] per fetch. There is no
/// pooling: each handle owns its connection until `close` is called.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Open a handle to the store
    ///
    /// # Errors
    /// Returns `FetchError::Connection` if the store is unreachable
    async fn connect(&self) -> FetchResult<Box<dyn StoreHandle>>;
}

/// An open connection to the key-value store
#[async_trait]
pub trait StoreHandle: Send {
    /// Read the payload stored under `key`
    ///
    /// Returns `None` when the key is absent or has expired.
    async fn get(&mut self, key: &CacheKey) -> FetchResult<Option<String>>;

    /// Write `payload` under `key`, expiring after `ttl`
    ///
    /// Overwrites any existing entry.
    async fn set_with_expiry(
        &mut self,
        key: &CacheKey,
        payload: &str,
        ttl: Duration,
    ) -> FetchResult<()>;

    /// Release the connection
    ///
    /// Must be safe to call once on every handle, whatever state it is in.
    async fn close(&mut self);
}
