use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use super::{KvStore, StoreError};

/// `KvStore` backed by Redis. One multiplexed connection per call; no retries.
#[derive(Clone)]
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn open(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        info!("Redis client initialized");
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<MultiplexedConnection, StoreError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<i64, StoreError> {
        let mut conn = self.connection().await?;
        // INCR + EXPIRE NX in one MULTI/EXEC. NX arms only a key with no TTL.
        let (count, armed): (i64, bool) = redis::pipe()
            .atomic()
            .incr(key, 1_i64)
            .expire(key, ttl_secs as i64)
            .arg("NX")
            .query_async(&mut conn)
            .await?;
        if armed {
            debug!("Started {ttl_secs}s window for {key}");
        }
        Ok(count)
    }
}
