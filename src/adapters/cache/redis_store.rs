//! Redis-backed key-value store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, ConnectionAddr, ConnectionInfo, RedisConnectionInfo, RedisError};
use std::time::Duration;
use tracing::debug;

use crate::domain::errors::{FetchError, FetchResult};
use crate::domain::models::{CacheKey, StoreConfig};
use crate::domain::ports::{KeyValueStore, StoreHandle};

/// Key-value store talking to a single Redis server.
///
/// Every `connect` opens a new connection and verifies it with `PING`.
pub struct RedisStore {
    client: Client,
    target: String,
    connect_timeout: Duration,
}

impl RedisStore {
    pub fn new(config: &StoreConfig) -> FetchResult<Self> {
        let info = connection_info(config)?;
        let target = format!(
            "{}:{}/{}",
            config.host.as_deref().unwrap_or_default(),
            config.port,
            config.database
        );
        let client = Client::open(info)
            .map_err(|e| FetchError::store_unreachable(format!("invalid address {target}: {e}")))?;

        Ok(Self {
            client,
            target,
            connect_timeout: config.connect_timeout(),
        })
    }

    /// `host:port/db` of the server, without credentials.
    pub fn target(&self) -> &str {
        &self.target
    }
}

fn connection_info(config: &StoreConfig) -> FetchResult<ConnectionInfo> {
    let host = config
        .host
        .clone()
        .ok_or_else(|| FetchError::store_unreachable("store.host is not configured"))?;

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host, config.port),
        redis: RedisConnectionInfo {
            db: config.database,
            password: config.password.clone(),
            ..Default::default()
        },
    })
}

/// Map a failed command onto the fetch error taxonomy.
///
/// Transport failures mean the store became unreachable; anything else is the
/// server rejecting the command.
fn command_error(err: &RedisError) -> FetchError {
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
    {
        FetchError::store_unreachable(err.to_string())
    } else {
        FetchError::Execution(format!("store command failed: {err}"))
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn connect(&self) -> FetchResult<Box<dyn StoreHandle>> {
        let open = async {
            let mut conn = self.client.get_multiplexed_async_connection().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, RedisError>(conn)
        };

        let conn = tokio::time::timeout(self.connect_timeout, open)
            .await
            .map_err(|_| {
                FetchError::store_unreachable(format!(
                    "{}: no response within {}s",
                    self.target,
                    self.connect_timeout.as_secs()
                ))
            })?
            .map_err(|e| FetchError::store_unreachable(format!("{}: {e}", self.target)))?;

        debug!(target_addr = %self.target, "connected to redis");
        Ok(Box::new(RedisHandle { conn: Some(conn) }))
    }
}

struct RedisHandle {
    conn: Option<MultiplexedConnection>,
}

impl RedisHandle {
    fn conn(&mut self) -> FetchResult<&mut MultiplexedConnection> {
        self.conn
            .as_mut()
            .ok_or_else(|| FetchError::store_unreachable("handle already closed"))
    }
}

#[async_trait]
impl StoreHandle for RedisHandle {
    async fn get(&mut self, key: &CacheKey) -> FetchResult<Option<String>> {
        let conn = self.conn()?;
        let raw: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(conn)
            .await
            .map_err(|e| command_error(&e))?;

        raw.map(|bytes| {
            String::from_utf8(bytes).map_err(|e| {
                FetchError::Serialization(format!("cached payload is not UTF-8: {e}"))
            })
        })
        .transpose()
    }

    async fn set_with_expiry(
        &mut self,
        key: &CacheKey,
        payload: &str,
        ttl: Duration,
    ) -> FetchResult<()> {
        // PX rejects 0
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let conn = self.conn()?;
        let _: () = redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("PX")
            .arg(millis)
            .query_async(conn)
            .await
            .map_err(|e| command_error(&e))?;
        Ok(())
    }

    async fn close(&mut self) {
        if self.conn.take().is_some() {
            debug!("closed redis connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str, port: u16) -> StoreConfig {
        StoreConfig {
            host: Some(host.to_string()),
            port,
            database: 3,
            password: Some("s3cret".to_string()),
            connect_timeout_secs: 2,
        }
    }

    #[test]
    fn test_connection_info() {
        let info = connection_info(&config("cache.internal", 6380)).unwrap();
        assert_eq!(info.redis.db, 3);
        assert_eq!(info.redis.password.as_deref(), Some("s3cret"));
        assert!(matches!(
            info.addr,
            ConnectionAddr::Tcp(ref host, 6380) if host == "cache.internal"
        ));
    }

    #[test]
    fn test_target_omits_password() {
        let store = RedisStore::new(&config("cache.internal", 6380)).unwrap();
        assert_eq!(store.target(), "cache.internal:6380/3");
        assert!(!store.target().contains("s3cret"));
    }

    #[test]
    fn test_missing_host() {
        let result = RedisStore::new(&StoreConfig::default());
        assert!(matches!(result, Err(FetchError::Connection { .. })));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        // Port 1 on loopback refuses connections
        let store = RedisStore::new(&config("127.0.0.1", 1)).unwrap();
        let err = store.connect().await.err().unwrap();
        assert_eq!(err.kind(), "connection");
        assert_eq!(err.exit_code(), crate::domain::errors::EXIT_CONNECTION);
    }
}
