use crate::domain::errors::FetchResult;
use crate::domain::models::{QueryResult, QuerySpec};
use async_trait::async_trait;

/// Port for the relational source of truth
#[async_trait]
pub trait RelationalSource: Send + Sync {
    /// Open a handle to the source
    ///
    /// # Errors
    /// Returns `FetchError::Connection` if the source is unreachable
    async fn connect(&self) -> FetchResult<Box<dyn SourceHandle>>;
}

/// An open connection to the relational source
#[async_trait]
pub trait SourceHandle: Send {
    /// Execute `query` and collect every row
    ///
    /// # Errors
    /// - `FetchError::Execution` if the source rejects the query
    /// - `FetchError::Serialization` if a column type has no `ColumnValue` form
    async fn execute(&mut self, query: &QuerySpec) -> FetchResult<QueryResult>;

    /// Release the connection
    async fn close(&mut self);
}
