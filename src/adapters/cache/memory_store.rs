//! In-process key-value store backed by a moka TTL cache.
//!
//! Each entry carries its own expiry, reset on overwrite. Handles share the
//! underlying cache, so every handle from one `MemoryStore` sees the same
//! entries.

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::CacheKey;
use crate::domain::ports::{KeyValueStore, StoreHandle};

/// Maximum number of entries kept before moka starts evicting.
const MEMORY_STORE_MAX_CAPACITY: u64 = 10_000;

#[derive(Clone)]
struct StoredEntry {
    payload: Arc<str>,
    ttl: Duration,
}

struct PerEntryTtl;

impl Expiry<String, StoredEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &StoredEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &StoredEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Key-value store living in process memory.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Cache<String, StoredEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_capacity(MEMORY_STORE_MAX_CAPACITY)
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { entries }
    }

    /// Whether a live entry exists under `key`.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.get(key.as_str()).await.is_some()
    }

    /// Store a payload directly, bypassing any handle.
    pub async fn seed(&self, key: &CacheKey, payload: impl Into<String>, ttl: Duration) {
        let payload: String = payload.into();
        self.entries
            .insert(
                key.as_str().to_string(),
                StoredEntry {
                    payload: Arc::from(payload),
                    ttl,
                },
            )
            .await;
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn connect(&self) -> FetchResult<Box<dyn StoreHandle>> {
        Ok(Box::new(MemoryHandle {
            entries: Some(self.entries.clone()),
        }))
    }
}

struct MemoryHandle {
    entries: Option<Cache<String, StoredEntry>>,
}

impl MemoryHandle {
    fn entries(&self) -> FetchResult<&Cache<String, StoredEntry>> {
        self.entries
            .as_ref()
            .ok_or_else(|| FetchError::store_unreachable("handle already closed"))
    }
}

#[async_trait]
impl StoreHandle for MemoryHandle {
    async fn get(&mut self, key: &CacheKey) -> FetchResult<Option<String>> {
        let entry = self.entries()?.get(key.as_str()).await;
        Ok(entry.map(|entry| entry.payload.to_string()))
    }

    async fn set_with_expiry(
        &mut self,
        key: &CacheKey,
        payload: &str,
        ttl: Duration,
    ) -> FetchResult<()> {
        self.entries()?
            .insert(
                key.as_str().to_string(),
                StoredEntry {
                    payload: Arc::from(payload),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn close(&mut self) {
        self.entries = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = MemoryStore::new();
        let mut handle = store.connect().await.unwrap();
        assert_eq!(handle.get(&CacheKey::new("absent")).await.unwrap(), None);
        handle.close().await;
    }

    #[tokio::test]
    async fn test_set_then_get_across_handles() {
        let store = MemoryStore::new();
        let key = CacheKey::new("books");

        let mut writer = store.connect().await.unwrap();
        writer
            .set_with_expiry(&key, "[[1]]", Duration::from_secs(60))
            .await
            .unwrap();
        writer.close().await;

        let mut reader = store.connect().await.unwrap();
        assert_eq!(reader.get(&key).await.unwrap().as_deref(), Some("[[1]]"));
        reader.close().await;
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let store = MemoryStore::new();
        let key = CacheKey::new("short");
        store.seed(&key, "[]", Duration::from_millis(50)).await;
        assert!(store.contains(&key).await);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(!store.contains(&key).await);
    }

    #[tokio::test]
    async fn test_overwrite_resets_expiry() {
        let store = MemoryStore::new();
        let key = CacheKey::new("k");
        store.seed(&key, "old", Duration::from_millis(50)).await;

        let mut handle = store.connect().await.unwrap();
        handle
            .set_with_expiry(&key, "new", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(handle.get(&key).await.unwrap().as_deref(), Some("new"));
        handle.close().await;
    }

    #[tokio::test]
    async fn test_closed_handle_rejects_use() {
        let store = MemoryStore::new();
        let mut handle = store.connect().await.unwrap();
        handle.close().await;
        assert!(matches!(
            handle.get(&CacheKey::new("k")).await,
            Err(FetchError::Connection { .. })
        ));
    }
}
