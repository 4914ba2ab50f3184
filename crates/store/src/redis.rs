use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;

use crate::{Store, StoreError};

/// Redis-backed store.
///
/// Holds a multiplexed async connection; clones of it are cheap and the
/// same instance can serve any number of concurrent callers.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to Redis and verify the connection with a PING.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        tracing::info!("Connecting to Redis");

        let client =
            redis::Client::open(url).map_err(|e| StoreError::Connection(e.to_string()))?;

        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let store = Self { conn };
        store.health_check().await?;
        tracing::info!("Redis connection established");

        Ok(store)
    }

    /// Verify the connection is alive (PING).
    pub async fn health_check(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        if pong != "PONG" {
            return Err(StoreError::Command(format!(
                "Unexpected PING response: {}",
                pong
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.conn.clone();

        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        Ok(value)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: Vec<u8>,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();

        // SET ... EX takes whole seconds; sub-second TTLs round up to 1.
        let secs = ttl.as_secs().max(1);

        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(secs)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();

        let count: i64 = redis::cmd("INCR")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        Ok(count)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();

        // DEL returns the number of keys removed; zero is fine.
        let _: i64 = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        Ok(())
    }
}
