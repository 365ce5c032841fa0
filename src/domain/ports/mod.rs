//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - KeyValueStore: get/set-with-expiry over opaque string payloads
//! - RelationalSource: query execution returning tabular rows
//!
//! The cache-aside service depends only on these traits, which keeps it
//! testable with in-memory and counting collaborators.

pub mod key_value_store;
pub mod relational_source;

pub use key_value_store::{KeyValueStore, StoreHandle};
pub use relational_source::{RelationalSource, SourceHandle};
