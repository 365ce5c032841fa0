use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteColumn, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Column, ConnectOptions, Connection, Row as _, Sqlite, TypeInfo, Value, ValueRef};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::adapters::relational::{connect_error, query_error, unsupported_column};
use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::{ColumnValue, QueryResult, QuerySpec, Row, SourceConfig};
use crate::domain::ports::{RelationalSource, SourceHandle};

/// Relational source backed by a SQLite database file.
///
/// The database must already exist; it is never created. Waits on a locked
/// database for at most the configured connect timeout.
pub struct SqliteSource {
    options: SqliteConnectOptions,
    target: String,
    connect_timeout: Duration,
    busy_timeout: Duration,
}

impl SqliteSource {
    /// # Errors
    /// `FetchError::Connection` if `url` is missing or does not parse.
    pub fn new(config: &SourceConfig) -> FetchResult<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| FetchError::source_unreachable("source.url is not configured"))?;

        let busy_timeout = config.connect_timeout();
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| FetchError::source_unreachable(format!("invalid source url {url}: {e}")))?
            .create_if_missing(false)
            .busy_timeout(busy_timeout)
            .disable_statement_logging();

        Ok(Self {
            options,
            target: url.to_string(),
            connect_timeout: config.connect_timeout(),
            busy_timeout,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// How long a statement waits for a lock held by another connection.
    pub const fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }
}

#[async_trait]
impl RelationalSource for SqliteSource {
    async fn connect(&self) -> FetchResult<Box<dyn SourceHandle>> {
        let conn = tokio::time::timeout(
            self.connect_timeout,
            SqliteConnection::connect_with(&self.options),
        )
        .await
        .map_err(|_| {
            FetchError::source_unreachable(format!(
                "{}: not opened within {}s",
                self.target,
                self.connect_timeout.as_secs()
            ))
        })?
        .map_err(|e| connect_error(&self.target, &e))?;

        debug!(target_addr = %self.target, "opened sqlite database");
        Ok(Box::new(SqliteHandle { conn: Some(conn) }))
    }
}

struct SqliteHandle {
    conn: Option<SqliteConnection>,
}

#[async_trait]
impl SourceHandle for SqliteHandle {
    async fn execute(&mut self, query: &QuerySpec) -> FetchResult<QueryResult> {
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| FetchError::source_unreachable("handle already closed"))?;

        let statement = query
            .params
            .iter()
            .fold(sqlx::query(&query.text), bind_param);
        let rows = statement.fetch_all(&mut *conn).await.map_err(query_error)?;

        let columns = rows
            .first()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = rows.iter().map(decode_row).collect::<FetchResult<Vec<Row>>>()?;

        debug!(rows = rows.len(), "sqlite query complete");
        Ok(QueryResult::new(columns, rows))
    }

    async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close().await {
                debug!(error = %e, "sqlite connection did not close cleanly");
            }
        }
    }
}

fn bind_param<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &'q ColumnValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        ColumnValue::Null => query.bind(None::<String>),
        ColumnValue::Integer(i) => query.bind(*i),
        ColumnValue::Float(f) => query.bind(*f),
        ColumnValue::Text(s) => query.bind(s.as_str()),
        ColumnValue::Boolean(b) => query.bind(*b),
        ColumnValue::Timestamp(ts) => query.bind(*ts),
    }
}

fn decode_row(row: &SqliteRow) -> FetchResult<Row> {
    row.columns()
        .iter()
        .map(|column| decode_column(row, column))
        .collect()
}

/// Decode one column by the storage class of its value.
///
/// SQLite types values, not columns, so the declared type only matters for
/// telling booleans apart from integers.
fn decode_column(row: &SqliteRow, column: &SqliteColumn) -> FetchResult<ColumnValue> {
    let idx = column.ordinal();
    let raw = row.try_get_raw(idx).map_err(query_error)?;
    if raw.is_null() {
        return Ok(ColumnValue::Null);
    }

    let value = ValueRef::to_owned(&raw);
    let storage = value.type_info().name().to_string();
    let declared_bool = column.type_info().name().eq_ignore_ascii_case("BOOLEAN");

    let decoded = match storage.as_str() {
        "INTEGER" if declared_bool => value.try_decode::<bool>().map(ColumnValue::from),
        "INTEGER" => value.try_decode::<i64>().map(ColumnValue::from),
        "REAL" => value.try_decode::<f64>().map(ColumnValue::from),
        "TEXT" => value.try_decode::<String>().map(ColumnValue::from),
        other => return Err(unsupported_column(column.name(), other)),
    };

    decoded.map_err(|e| FetchError::Serialization(format!("column '{}': {e}", column.name())))
}
