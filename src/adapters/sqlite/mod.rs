//! SQLite relational source.

pub mod source;

pub use source::SqliteSource;
