//! Domain layer for cachefront
//!
//! This module contains the cache-aside data model, the ports implemented by
//! collaborator adapters, and the error taxonomy.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{Collaborator, FetchError, FetchResult};
