//! Domain errors for the cache-aside fetcher.

use std::fmt;

use thiserror::Error;

/// Which external collaborator an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    /// The key-value cache.
    Store,
    /// The relational source of truth.
    Source,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store => write!(f, "key-value store"),
            Self::Source => write!(f, "relational source"),
        }
    }
}

/// Errors that abort a single fetch attempt.
///
/// Every variant means "no result": the fetcher never returns partial data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to connect to {collaborator}: {message}")]
    Connection {
        collaborator: Collaborator,
        message: String,
    },

    #[error("Query execution failed: {0}")]
    Execution(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type FetchResult<T> = Result<T, FetchError>;

/// Process exit code for a successful fetch.
pub const EXIT_SUCCESS: i32 = 0;
/// Process exit code when the store or source is unreachable.
pub const EXIT_CONNECTION: i32 = 1;
/// Process exit code when the source or store rejects an operation.
pub const EXIT_EXECUTION: i32 = 2;
/// Process exit code when a result cannot be encoded or a payload decoded.
pub const EXIT_SERIALIZATION: i32 = 3;
/// Process exit code for invalid configuration or command-line usage.
pub const EXIT_CONFIG: i32 = 4;

impl FetchError {
    pub fn store_unreachable(message: impl Into<String>) -> Self {
        Self::Connection {
            collaborator: Collaborator::Store,
            message: message.into(),
        }
    }

    pub fn source_unreachable(message: impl Into<String>) -> Self {
        Self::Connection {
            collaborator: Collaborator::Source,
            message: message.into(),
        }
    }

    /// Short machine-readable name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Execution(_) => "execution",
            Self::Serialization(_) => "serialization",
        }
    }

    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Connection { .. } => EXIT_CONNECTION,
            Self::Execution(_) => EXIT_EXECUTION,
            Self::Serialization(_) => EXIT_SERIALIZATION,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            FetchError::store_unreachable("refused").exit_code(),
            FetchError::Execution("syntax error".into()).exit_code(),
            FetchError::Serialization("NaN".into()).exit_code(),
        ];
        assert_eq!(codes, [EXIT_CONNECTION, EXIT_EXECUTION, EXIT_SERIALIZATION]);
        assert!(!codes.contains(&EXIT_SUCCESS));
        assert!(!codes.contains(&EXIT_CONFIG));
    }

    #[test]
    fn test_connection_message_names_collaborator() {
        let err = FetchError::source_unreachable("timed out");
        assert_eq!(
            err.to_string(),
            "Failed to connect to relational source: timed out"
        );
        assert_eq!(err.kind(), "connection");
    }

    #[test]
    fn test_from_serde_json_error() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FetchError = parse_err.into();
        assert!(matches!(err, FetchError::Serialization(_)));
    }
}
