//! Query specification and cache keys.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::value::ColumnValue;

/// Prefix for keys derived from query text.
pub const DERIVED_KEY_PREFIX: &str = "cachefront:q:";

/// A query to run against the relational source on a cache miss.
///
/// The text is passed to the source verbatim. Values that come from
/// untrusted input belong in `params`, bound positionally (`$1`, `$2`, ...
/// for Postgres, `?` for SQLite).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub text: String,
    #[serde(default)]
    pub params: Vec<ColumnValue>,
}

impl QuerySpec {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
        }
    }

    pub fn with_params(text: impl Into<String>, params: Vec<ColumnValue>) -> Self {
        Self {
            text: text.into(),
            params,
        }
    }

    /// Query text with whitespace runs collapsed and any trailing `;` removed.
    pub fn normalized_text(&self) -> String {
        let collapsed = self.text.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.trim_end_matches(';').trim_end().to_string()
    }
}

/// Opaque string identifying a cached result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Derive a key that is bound to the query and its parameters.
    ///
    /// Queries differing only in whitespace or a trailing semicolon map to the
    /// same key; different parameters never do.
    pub fn derive(query: &QuerySpec) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(query.normalized_text().as_bytes());
        hasher.update([0u8]);
        let params = serde_json::to_string(&query.params).unwrap_or_default();
        hasher.update(params.as_bytes());
        Self(format!("{DERIVED_KEY_PREFIX}{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CacheKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
