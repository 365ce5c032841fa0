use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::time::Duration;

/// Main configuration structure for cachefront
///
/// Built once at startup by `ConfigLoader` and handed to constructors; nothing
/// on the fetch path reads the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Key-value store (Redis) connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Relational source connection
    #[serde(default)]
    pub source: SourceConfig,

    /// Cache-aside behaviour
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Key-value store configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StoreConfig {
    /// Store hostname (required)
    #[serde(default, deserialize_with = "lenient_string")]
    pub host: Option<String>,

    /// Store port
    #[serde(default = "default_store_port")]
    pub port: u16,

    /// Logical database index
    #[serde(default)]
    pub database: i64,

    /// Optional AUTH password
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,

    /// Seconds to wait for the connection and PING
    #[serde(default = "default_store_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

const fn default_store_port() -> u16 {
    6379
}

const fn default_store_connect_timeout_secs() -> u64 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: default_store_port(),
            database: 0,
            password: None,
            connect_timeout_secs: default_store_connect_timeout_secs(),
        }
    }
}

impl StoreConfig {
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("password", &redacted(self.password.as_ref()))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Relational source configuration
///
/// Either `url` (a `postgres://` or `sqlite:` URL) or the discrete
/// host/database/user/password fields must be provided.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SourceConfig {
    /// Full connection URL; takes precedence over the discrete fields
    #[serde(default, deserialize_with = "lenient_string")]
    pub url: Option<String>,

    /// Postgres hostname
    #[serde(default, deserialize_with = "lenient_string")]
    pub host: Option<String>,

    /// Postgres port
    #[serde(default = "default_source_port")]
    pub port: u16,

    /// Database name
    #[serde(default, deserialize_with = "lenient_string")]
    pub database: Option<String>,

    /// Login role
    #[serde(default, deserialize_with = "lenient_string")]
    pub user: Option<String>,

    /// Login password
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,

    /// Seconds to wait for the connection to be established
    #[serde(default = "default_source_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

const fn default_source_port() -> u16 {
    5432
}

const fn default_source_connect_timeout_secs() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: default_source_port(),
            database: None,
            user: None,
            password: None,
            connect_timeout_secs: default_source_connect_timeout_secs(),
        }
    }
}

/// Relational driver selected by a `SourceConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceDriver {
    Postgres,
    Sqlite,
}

impl SourceConfig {
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Driver implied by `url`, or Postgres when only discrete fields are set.
    ///
    /// Returns `None` for a URL with an unrecognised scheme.
    pub fn driver(&self) -> Option<SourceDriver> {
        match self.url.as_deref() {
            None => Some(SourceDriver::Postgres),
            Some(url) if url.starts_with("sqlite:") => Some(SourceDriver::Sqlite),
            Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {
                Some(SourceDriver::Postgres)
            }
            Some(_) => None,
        }
    }
}

impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &redacted(self.password.as_ref()))
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// Cache-aside configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CacheConfig {
    /// Expiry applied to entries written on a cache miss
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

const fn default_ttl_secs() -> u64 {
    120
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for an additional JSON log file
    #[serde(default)]
    pub log_dir: Option<String>,

    /// Log file rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

fn redacted(secret: Option<&String>) -> Option<&'static str> {
    secret.map(|_| "[REDACTED]")
}

/// Accept strings, numbers and booleans for string fields.
///
/// Environment values such as `PG_PASSWORD=12345` arrive as numbers.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Str(String),
        Int(i64),
        UInt(u64),
        Float(f64),
        Bool(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Str(s) => s,
        Scalar::Int(i) => i.to_string(),
        Scalar::UInt(u) => u.to_string(),
        Scalar::Float(f) => f.to_string(),
        Scalar::Bool(b) => b.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.port, 6379);
        assert_eq!(config.store.database, 0);
        assert!(config.store.host.is_none());
        assert_eq!(config.source.port, 5432);
        assert_eq!(config.cache.ttl(), Duration::from_secs(120));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_debug_redacts_passwords() {
        let source = SourceConfig {
            url: Some("postgres://app:hunter2@db/app".to_string()),
            password: Some("hunter2".to_string()),
            ..Default::default()
        };
        let store = StoreConfig {
            password: Some("s3cret".to_string()),
            ..Default::default()
        };

        let rendered = format!("{source:?} {store:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_source_driver() {
        let mut source = SourceConfig::default();
        assert_eq!(source.driver(), Some(SourceDriver::Postgres));

        source.url = Some("sqlite:///tmp/app.db".to_string());
        assert_eq!(source.driver(), Some(SourceDriver::Sqlite));

        source.url = Some("postgresql://app@db/app".to_string());
        assert_eq!(source.driver(), Some(SourceDriver::Postgres));

        source.url = Some("mysql://app@db/app".to_string());
        assert_eq!(source.driver(), None);
    }

    #[test]
    fn test_lenient_string_accepts_numbers() {
        let source: SourceConfig =
            serde_json::from_str(r#"{"password": 12345, "user": "app"}"#).unwrap();
        assert_eq!(source.password.as_deref(), Some("12345"));
        assert_eq!(source.user.as_deref(), Some("app"));
        assert!(source.host.is_none());
    }
}
