//! Mock collaborators for testing.
//!
//! Both mocks count every connect, close and command so tests can check that
//! handles are released on each path.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::{CacheKey, QueryResult, QuerySpec};
use crate::domain::ports::{KeyValueStore, RelationalSource, SourceHandle, StoreHandle};

#[derive(Default)]
struct StoreState {
    entries: Mutex<HashMap<String, (String, Instant)>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    gets: AtomicUsize,
    writes: AtomicUsize,
    unreachable: AtomicBool,
    failing_writes: AtomicBool,
}

/// Mock key-value store.
#[derive(Clone, Default)]
pub struct MockStore {
    state: Arc<StoreState>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `connect` always fails.
    pub fn unreachable() -> Self {
        let store = Self::new();
        store.state.unreachable.store(true, Ordering::SeqCst);
        store
    }

    /// A store whose writes fail with an execution error.
    pub fn failing_writes() -> Self {
        let store = Self::new();
        store.state.failing_writes.store(true, Ordering::SeqCst);
        store
    }

    pub async fn seed(&self, key: &CacheKey, payload: impl Into<String>, ttl: Duration) {
        self.state.entries.lock().await.insert(
            key.as_str().to_string(),
            (payload.into(), Instant::now() + ttl),
        );
    }

    /// Live payload under `key`, without counting as a command.
    pub async fn peek(&self, key: &CacheKey) -> Option<String> {
        let entries = self.state.entries.lock().await;
        entries
            .get(key.as_str())
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(payload, _)| payload.clone())
    }

    /// Remaining lifetime of the entry under `key`.
    pub async fn ttl_of(&self, key: &CacheKey) -> Option<Duration> {
        let entries = self.state.entries.lock().await;
        entries
            .get(key.as_str())
            .map(|(_, expires_at)| expires_at.saturating_duration_since(Instant::now()))
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.state.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for MockStore {
    async fn connect(&self) -> FetchResult<Box<dyn StoreHandle>> {
        if self.state.unreachable.load(Ordering::SeqCst) {
            return Err(FetchError::store_unreachable("mock store is unreachable"));
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStoreHandle {
            state: Arc::clone(&self.state),
            open: true,
        }))
    }
}

struct MockStoreHandle {
    state: Arc<StoreState>,
    open: bool,
}

#[async_trait]
impl StoreHandle for MockStoreHandle {
    async fn get(&mut self, key: &CacheKey) -> FetchResult<Option<String>> {
        self.state.gets.fetch_add(1, Ordering::SeqCst);
        let entries = self.state.entries.lock().await;
        Ok(entries
            .get(key.as_str())
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(payload, _)| payload.clone()))
    }

    async fn set_with_expiry(
        &mut self,
        key: &CacheKey,
        payload: &str,
        ttl: Duration,
    ) -> FetchResult<()> {
        if self.state.failing_writes.load(Ordering::SeqCst) {
            return Err(FetchError::Execution("mock store rejected SET".to_string()));
        }
        self.state.writes.fetch_add(1, Ordering::SeqCst);
        self.state.entries.lock().await.insert(
            key.as_str().to_string(),
            (payload.to_string(), Instant::now() + ttl),
        );
        Ok(())
    }

    async fn close(&mut self) {
        if std::mem::take(&mut self.open) {
            self.state.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

enum Behaviour {
    Rows(QueryResult),
    Fail(String),
    Unreachable,
}

struct SourceState {
    behaviour: Behaviour,
    connects: AtomicUsize,
    closes: AtomicUsize,
    executions: AtomicUsize,
    last_query: Mutex<Option<QuerySpec>>,
}

/// Mock relational source.
#[derive(Clone)]
pub struct MockSource {
    state: Arc<SourceState>,
}

impl MockSource {
    fn with_behaviour(behaviour: Behaviour) -> Self {
        Self {
            state: Arc::new(SourceState {
                behaviour,
                connects: AtomicUsize::new(0),
                closes: AtomicUsize::new(0),
                executions: AtomicUsize::new(0),
                last_query: Mutex::new(None),
            }),
        }
    }

    /// A source answering every query with `result`.
    pub fn returning(result: QueryResult) -> Self {
        Self::with_behaviour(Behaviour::Rows(result))
    }

    /// A source rejecting every query with an execution error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behaviour(Behaviour::Fail(message.into()))
    }

    /// A source whose `connect` always fails.
    pub fn unreachable() -> Self {
        Self::with_behaviour(Behaviour::Unreachable)
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn executions(&self) -> usize {
        self.state.executions.load(Ordering::SeqCst)
    }

    pub async fn last_query(&self) -> Option<QuerySpec> {
        self.state.last_query.lock().await.clone()
    }
}

#[async_trait]
impl RelationalSource for MockSource {
    async fn connect(&self) -> FetchResult<Box<dyn SourceHandle>> {
        if matches!(self.state.behaviour, Behaviour::Unreachable) {
            return Err(FetchError::source_unreachable("mock source is unreachable"));
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSourceHandle {
            state: Arc::clone(&self.state),
            open: true,
        }))
    }
}

struct MockSourceHandle {
    state: Arc<SourceState>,
    open: bool,
}

#[async_trait]
impl SourceHandle for MockSourceHandle {
    async fn execute(&mut self, query: &QuerySpec) -> FetchResult<QueryResult> {
        self.state.executions.fetch_add(1, Ordering::SeqCst);
        *self.state.last_query.lock().await = Some(query.clone());
        match &self.state.behaviour {
            Behaviour::Rows(result) => Ok(result.clone()),
            Behaviour::Fail(message) => Err(FetchError::Execution(message.clone())),
            Behaviour::Unreachable => Err(FetchError::source_unreachable("mock source is unreachable")),
        }
    }

    async fn close(&mut self) {
        if std::mem::take(&mut self.open) {
            self.state.closes.fetch_add(1, Ordering::SeqCst);
        }
    }
}
