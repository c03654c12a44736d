//! In-memory cache implementation using the moka crate.
//!
//! Every read-modify-write goes through moka's per-key `and_compute_with`,
//! which serializes concurrent computations on the same key. Expiry is
//! tracked per entry, so locks and counters can live side by side.

use std::future::ready;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};

use coursehub_core::config::MemoryCacheConfig;
use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::traits::CacheProvider;

/// How an entry's expiry changes when it is written.
#[derive(Debug, Clone, Copy)]
enum Expiration {
    /// No expiry.
    Never,
    /// Expire this long after the write.
    After(Duration),
    /// Keep whatever expiry the previous value had (none if new).
    Keep,
}

#[derive(Debug, Clone)]
struct Slot {
    value: String,
    expiration: Expiration,
}

impl Slot {
    fn new(value: impl Into<String>, expiration: Expiration) -> Self {
        Self {
            value: value.into(),
            expiration,
        }
    }
}

struct SlotExpiry;

impl Expiry<String, Slot> for SlotExpiry {
    fn expire_after_create(&self, _key: &String, slot: &Slot, _at: Instant) -> Option<Duration> {
        match slot.expiration {
            Expiration::After(ttl) => Some(ttl),
            Expiration::Never | Expiration::Keep => None,
        }
    }

    fn expire_after_update(
        &self,
        _key: &String,
        slot: &Slot,
        _at: Instant,
        remaining: Option<Duration>,
    ) -> Option<Duration> {
        match slot.expiration {
            Expiration::After(ttl) => Some(ttl),
            Expiration::Never => None,
            Expiration::Keep => remaining,
        }
    }
}

/// In-memory cache provider using moka.
///
/// Entries are only ever evicted by expiry unless `max_capacity` is
/// exceeded, so size it well above the number of courses.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    cache: Cache<String, Slot>,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(SlotExpiry)
            .build();
        Self { cache }
    }

    async fn add(&self, key: &str, delta: i64) -> AppResult<i64> {
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|existing| {
                let current = match existing {
                    None => Some(0),
                    Some(entry) => entry.value().value.parse::<i64>().ok(),
                };
                let op = match current.and_then(|v| v.checked_add(delta)) {
                    Some(next) => Op::Put(Slot::new(next.to_string(), Expiration::Keep)),
                    None => Op::Nop,
                };
                ready(op)
            })
            .await;

        match result {
            CompResult::Inserted(entry) | CompResult::ReplacedWith(entry) => entry
                .value()
                .value
                .parse::<i64>()
                .map_err(|_| AppError::cache(format!("Counter '{key}' holds a non-integer"))),
            _ => Err(AppError::cache(format!(
                "Value at '{key}' is not an integer or out of range"
            ))),
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await.map(|slot| slot.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), Slot::new(value, Expiration::After(ttl)))
            .await;
        Ok(())
    }

    async fn set_persistent(&self, key: &str, value: &str) -> AppResult<()> {
        self.cache
            .insert(key.to_string(), Slot::new(value, Expiration::Never))
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.get(key).await.is_some())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        let slot = Slot::new(value, Expiration::After(ttl));
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|existing| {
                ready(match existing {
                    Some(_) => Op::Nop,
                    None => Op::Put(slot),
                })
            })
            .await;
        Ok(matches!(result, CompResult::Inserted(_)))
    }

    async fn compare_and_delete(&self, key: &str, expected: &str) -> AppResult<bool> {
        let result = self
            .cache
            .entry(key.to_string())
            .and_compute_with(|existing| {
                ready(match existing {
                    Some(entry) if entry.value().value == expected => Op::Remove,
                    _ => Op::Nop,
                })
            })
            .await;
        Ok(matches!(result, CompResult::Removed(_)))
    }

    async fn incr(&self, key: &str) -> AppResult<i64> {
        self.add(key, 1).await
    }

    async fn decr(&self, key: &str) -> AppResult<i64> {
        self.add(key, -1).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn make_provider() -> MemoryCacheProvider {
        MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 1000 })
    }

    #[tokio::test]
    async fn test_set_get_delete() {
        let provider = make_provider();
        provider.set_persistent("key1", "value1").await.unwrap();
        assert_eq!(provider.get("key1").await.unwrap(), Some("value1".to_string()));
        assert!(provider.exists("key1").await.unwrap());

        provider.delete("key1").await.unwrap();
        assert_eq!(provider.get("key1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_incr_decr_from_missing_key() {
        let provider = make_provider();
        assert_eq!(provider.decr("counter").await.unwrap(), -1);
        assert_eq!(provider.incr("counter").await.unwrap(), 0);
        assert_eq!(provider.incr("counter").await.unwrap(), 1);
        assert_eq!(provider.get("counter").await.unwrap(), Some("1".to_string()));
    }

    #[tokio::test]
    async fn test_incr_non_integer_fails() {
        let provider = make_provider();
        provider.set_persistent("word", "abc").await.unwrap();
        assert!(provider.incr("word").await.is_err());
        assert_eq!(provider.get("word").await.unwrap(), Some("abc".to_string()));
    }

    #[tokio::test]
    async fn test_set_nx_respects_existing_and_expiry() {
        let provider = make_provider();
        let ttl = Duration::from_millis(100);
        assert!(provider.set_nx("nx_key", "a", ttl).await.unwrap());
        assert!(!provider.set_nx("nx_key", "b", ttl).await.unwrap());
        assert_eq!(provider.get("nx_key").await.unwrap(), Some("a".to_string()));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(provider.get("nx_key").await.unwrap(), None);
        assert!(provider.set_nx("nx_key", "b", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn test_compare_and_delete() {
        let provider = make_provider();
        provider
            .set("lock", "token-a", Duration::from_secs(10))
            .await
            .unwrap();

        assert!(!provider.compare_and_delete("lock", "token-b").await.unwrap());
        assert!(provider.exists("lock").await.unwrap());
        assert!(provider.compare_and_delete("lock", "token-a").await.unwrap());
        assert!(!provider.exists("lock").await.unwrap());
        assert!(!provider.compare_and_delete("lock", "token-a").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_persistent_clears_ttl() {
        let provider = make_provider();
        provider
            .set("k", "short", Duration::from_millis(50))
            .await
            .unwrap();
        provider.set_persistent("k", "long").await.unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(provider.get("k").await.unwrap(), Some("long".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_set_nx_has_single_winner() {
        let provider = Arc::new(make_provider());
        let mut handles = Vec::new();
        for i in 0..32 {
            let p = provider.clone();
            handles.push(tokio::spawn(async move {
                p.set_nx("contended", &i.to_string(), Duration::from_secs(5))
                    .await
                    .unwrap()
            }));
        }
        let mut winners = 0;
        for h in handles {
            if h.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_decr_is_atomic() {
        let provider = Arc::new(make_provider());
        provider.set_persistent("stock", "100").await.unwrap();
        let mut handles = Vec::new();
        for _ in 0..50 {
            let p = provider.clone();
            handles.push(tokio::spawn(async move { p.decr("stock").await.unwrap() }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(provider.get("stock").await.unwrap(), Some("50".to_string()));
    }
}
