//! Adapters for the external systems behind the ports.
//!
//! - `cache`: key-value stores (Redis, in-memory)
//! - `postgres`, `sqlite`: relational sources
//! - `mock`: counting test doubles for both ports

pub mod cache;
pub mod mock;
pub mod postgres;
pub mod relational;
pub mod sqlite;

pub use relational::build_source;
