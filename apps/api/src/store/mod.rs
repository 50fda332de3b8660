//! Remote key-value state: paid-access records and rate-limit counters.
//!
//! Everything the backend remembers between requests lives here. Handlers talk
//! to the `KvStore` trait; production uses `RedisStore`.
//!
//! Paid-access updates are plain read-modify-write. Two concurrent generations
//! for the same identifier can both read the same credit count and both
//! deduct from it. Rate-limit counters rely on the store's atomic `INCR`.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::access::PaidAccess;

#[cfg(test)]
pub mod memory;
pub mod redis_store;

pub use redis_store::RedisStore;

/// Key prefix for paid-access records. Bumped when the record shape changes.
pub const ACCESS_KEY_PREFIX: &str = "paid_v2_";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("corrupt record at {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode record: {0}")]
    Encode(serde_json::Error),
}

/// Minimal key-value surface the handlers need.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Increments the counter at `key` and returns the new value, atomically
    /// with its expiry. A counter without an expiry (a new window) gets a
    /// `ttl_secs` one; a live expiry is left alone.
    async fn incr_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<i64, StoreError>;
}

pub fn access_key(hashed_identifier: &str) -> String {
    format!("{ACCESS_KEY_PREFIX}{hashed_identifier}")
}

pub fn rate_limit_key(op: &str, ip: &str) -> String {
    format!("ratelimit_{op}_{ip}")
}

pub async fn load_access(
    store: &dyn KvStore,
    hashed_identifier: &str,
) -> Result<Option<PaidAccess>, StoreError> {
    let key = access_key(hashed_identifier);
    match store.get(&key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key, source }),
        None => Ok(None),
    }
}

/// Writes `record`, replacing whatever was stored for the identifier.
pub async fn save_access(
    store: &dyn KvStore,
    hashed_identifier: &str,
    record: &PaidAccess,
) -> Result<(), StoreError> {
    let raw = serde_json::to_string(record).map_err(StoreError::Encode)?;
    store.set(&access_key(hashed_identifier), &raw).await
}
