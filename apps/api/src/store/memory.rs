use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{KvStore, StoreError, ACCESS_KEY_PREFIX};

/// In-process `KvStore` for tests. Expiry follows tokio's clock so tests can
/// pause and advance time.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, (String, Option<Instant>)>>,
}

impl MemoryStore {
    pub fn access_record_count(&self) -> usize {
        let entries = self.entries.lock().unwrap();
        entries
            .keys()
            .filter(|k| k.starts_with(ACCESS_KEY_PREFIX))
            .count()
    }

    fn live_value(
        entries: &mut HashMap<String, (String, Option<Instant>)>,
        key: &str,
    ) -> Option<String> {
        let expired = matches!(entries.get(key), Some((_, Some(deadline))) if Instant::now() >= *deadline);
        if expired {
            entries.remove(key);
        }
        entries.get(key).map(|(v, _)| v.clone())
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        Ok(Self::live_value(&mut entries, key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (value.to_string(), None));
        Ok(())
    }

    async fn incr_with_expiry(&self, key: &str, ttl_secs: u64) -> Result<i64, StoreError> {
        let mut entries = self.entries.lock().unwrap();
        let current = Self::live_value(&mut entries, key)
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(0);
        let count = current + 1;
        // Same as `EXPIRE .. NX`: keep a live deadline, arm a missing one.
        let deadline = entries
            .get(key)
            .and_then(|(_, d)| *d)
            .or_else(|| Some(Instant::now() + Duration::from_secs(ttl_secs)));
        entries.insert(key.to_string(), (count.to_string(), deadline));
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_counter_without_deadline_is_rearmed() {
        let store = MemoryStore::default();
        // A counter that lost its TTL, e.g. from an interrupted earlier write.
        store.set("ratelimit_gen_1.2.3.4", "10").await.unwrap();

        assert_eq!(
            store.incr_with_expiry("ratelimit_gen_1.2.3.4", 600).await.unwrap(),
            11
        );

        tokio::time::advance(Duration::from_secs(601)).await;
        assert_eq!(
            store.incr_with_expiry("ratelimit_gen_1.2.3.4", 600).await.unwrap(),
            1
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_does_not_slide() {
        let store = MemoryStore::default();
        store.incr_with_expiry("k", 10).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(store.incr_with_expiry("k", 10).await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.incr_with_expiry("k", 10).await.unwrap(), 1);
    }
}
