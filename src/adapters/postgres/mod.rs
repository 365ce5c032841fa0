//! PostgreSQL relational source.

pub mod source;

pub use source::PostgresSource;
