//! Fixed-window, per-IP rate limits stored as expiring counters.

use tracing::warn;

use crate::errors::AppError;
use crate::store::{rate_limit_key, KvStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    /// Key segment, e.g. `gen` in `ratelimit_gen_<ip>`.
    pub op: &'static str,
    pub max_requests: i64,
    pub window_secs: u64,
    pub message: &'static str,
}

pub const GENERATE_LIMIT: RateLimitRule = RateLimitRule {
    op: "gen",
    max_requests: 10,
    window_secs: 600,
    message: "Too many requests. Please wait 10 minutes.",
};

/// Kept tight to make signature guessing impractical.
pub const VERIFY_LIMIT: RateLimitRule = RateLimitRule {
    op: "verify",
    max_requests: 5,
    window_secs: 300,
    message: "Too many verification attempts",
};

/// Counts this request against `rule` and rejects it once the window is full.
pub async fn enforce(store: &dyn KvStore, rule: &RateLimitRule, ip: &str) -> Result<(), AppError> {
    let count = store
        .incr_with_expiry(&rate_limit_key(rule.op, ip), rule.window_secs)
        .await?;

    if count > rule.max_requests {
        warn!(
            "Rate limit '{}' exceeded for {ip}: {count}/{}",
            rule.op, rule.max_requests
        );
        return Err(AppError::RateLimited(rule.message.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn test_eleventh_generation_in_window_is_rejected() {
        let store = MemoryStore::default();
        for _ in 0..10 {
            enforce(&store, &GENERATE_LIMIT, "1.2.3.4").await.unwrap();
        }
        let err = enforce(&store, &GENERATE_LIMIT, "1.2.3.4")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RateLimited(_)));
    }

    #[tokio::test]
    async fn test_limits_are_per_ip_and_per_op() {
        let store = MemoryStore::default();
        for _ in 0..5 {
            enforce(&store, &VERIFY_LIMIT, "1.1.1.1").await.unwrap();
        }
        assert!(enforce(&store, &VERIFY_LIMIT, "1.1.1.1").await.is_err());
        assert!(enforce(&store, &VERIFY_LIMIT, "2.2.2.2").await.is_ok());
        assert!(enforce(&store, &GENERATE_LIMIT, "1.1.1.1").await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_expires() {
        let store = MemoryStore::default();
        for _ in 0..5 {
            enforce(&store, &VERIFY_LIMIT, "1.1.1.1").await.unwrap();
        }
        assert!(enforce(&store, &VERIFY_LIMIT, "1.1.1.1").await.is_err());

        tokio::time::advance(Duration::from_secs(301)).await;
        assert!(enforce(&store, &VERIFY_LIMIT, "1.1.1.1").await.is_ok());
    }
}
