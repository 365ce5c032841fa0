//! Key-value store adapters.
//!
//! `RedisStore` is the production store. `MemoryStore` keeps entries in
//! process memory with moka and is used when no network store is wanted,
//! mostly in tests.

pub mod memory_store;
pub mod redis_store;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
