pub mod config;
pub mod query;
pub mod result;
pub mod value;

pub use config::{CacheConfig, Config, LoggingConfig, SourceConfig, SourceDriver, StoreConfig};
pub use query::{CacheKey, QuerySpec, DERIVED_KEY_PREFIX};
pub use result::{QueryResult, Row};
pub use value::ColumnValue;
