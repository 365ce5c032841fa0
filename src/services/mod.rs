pub mod cache_aside;
pub mod wire_format;

pub use cache_aside::{CacheAsideFetcher, CacheStatus, Fetched};
