//! Driver-agnostic helpers shared by the relational source adapters.

use std::sync::Arc;

use crate::adapters::postgres::PostgresSource;
use crate::adapters::sqlite::SqliteSource;
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::{SourceConfig, SourceDriver};
use crate::domain::ports::RelationalSource;
use crate::infrastructure::logging::scrub_secrets;

/// Build the relational source described by `config`.
///
/// # Errors
/// `FetchError::Connection` if the URL scheme is not supported or the
/// connection settings are incomplete.
pub fn build_source(config: &SourceConfig) -> FetchResult<Arc<dyn RelationalSource>> {
    match config.driver() {
        Some(SourceDriver::Postgres) => Ok(Arc::new(PostgresSource::new(config)?)),
        Some(SourceDriver::Sqlite) => Ok(Arc::new(SqliteSource::new(config)?)),
        None => Err(FetchError::source_unreachable(format!(
            "unsupported source url: {}",
            scrub_secrets(config.url.as_deref().unwrap_or_default())
        ))),
    }
}

/// Map a driver error raised while running a query.
///
/// Transport failures mean the source went away mid-query; rejected SQL is an
/// execution error; a value the driver could not decode is a serialization
/// error.
pub(crate) fn query_error(err: sqlx::Error) -> FetchError {
    match err {
        sqlx::Error::Database(db) => FetchError::Execution(db.to_string()),
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Protocol(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => FetchError::source_unreachable(scrub_secrets(&err.to_string())),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            FetchError::Serialization(err.to_string())
        }
        other => FetchError::Execution(other.to_string()),
    }
}

/// A column whose type has no `ColumnValue` form.
pub(crate) fn unsupported_column(column: &str, type_name: &str) -> FetchError {
    FetchError::Serialization(format!(
        "column '{column}' has unsupported type {type_name}"
    ))
}

/// Map a failed connection attempt.
pub(crate) fn connect_error(target: &str, err: &sqlx::Error) -> FetchError {
    FetchError::source_unreachable(scrub_secrets(&format!("{target}: {err}")))
}
