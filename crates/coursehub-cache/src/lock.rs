//! Per-course mutual exclusion on top of the shared cache.
//!
//! A lock is a cache entry holding a random token with a fixed expiry.
//! Acquisition is a single `SET NX` attempt; release deletes the entry only
//! if it still holds the caller's token. There is no renewal: a holder that
//! outlives the expiry loses exclusivity.

use std::time::{Duration, Instant};

use tracing::{debug, warn};
use uuid::Uuid;

use coursehub_core::result::AppResult;
use coursehub_core::traits::CacheProvider;
use coursehub_core::types::CourseId;

use crate::keys;
use crate::provider::CacheManager;

/// Acquires per-course locks.
#[derive(Debug, Clone)]
pub struct CourseLock {
    cache: CacheManager,
    ttl: Duration,
}

impl CourseLock {
    /// Create a lock service with the given entry expiry.
    pub fn new(cache: CacheManager, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Lock entry expiry.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create `key` holding `token` if absent. Returns `true` iff the
    /// caller is now the holder.
    pub async fn acquire(&self, key: &str, token: &str, ttl: Duration) -> AppResult<bool> {
        self.cache.set_nx(key, token, ttl).await
    }

    /// Delete `key` if it still holds `token`. A mismatch is a silent no-op.
    pub async fn release(&self, key: &str, token: &str) -> AppResult<bool> {
        self.cache.compare_and_delete(key, token).await
    }

    /// Single attempt at the lock for `course_id` with a fresh token.
    ///
    /// Returns `None` if another holder has it.
    pub async fn try_acquire(&self, course_id: CourseId) -> AppResult<Option<LockGuard>> {
        let key = keys::course_lock(course_id);
        let token = Uuid::new_v4().to_string();

        if !self.acquire(&key, &token, self.ttl).await? {
            debug!(course_id = %course_id, "Course lock held elsewhere");
            return Ok(None);
        }

        debug!(course_id = %course_id, "Course lock acquired");
        Ok(Some(LockGuard {
            cache: self.cache.clone(),
            key,
            token,
            ttl: self.ttl,
            acquired_at: Instant::now(),
            released: false,
        }))
    }
}

/// Holder handle for a course lock.
///
/// Call [`LockGuard::release`] on every path out of the critical section.
/// If the guard is dropped without it (panic, cancelled future), release
/// is spawned onto the current runtime.
#[derive(Debug)]
pub struct LockGuard {
    cache: CacheManager,
    key: String,
    token: String,
    ttl: Duration,
    acquired_at: Instant,
    released: bool,
}

impl LockGuard {
    /// The lock key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Time since acquisition.
    pub fn elapsed(&self) -> Duration {
        self.acquired_at.elapsed()
    }

    /// Whether the entry may already have expired.
    pub fn is_expired(&self) -> bool {
        self.elapsed() >= self.ttl
    }

    /// Release the lock. Returns `false` if the entry had already expired or
    /// been taken over.
    pub async fn release(mut self) -> AppResult<bool> {
        self.released = true;
        let deleted = self.cache.compare_and_delete(&self.key, &self.token).await?;
        if !deleted {
            warn!(
                key = %self.key,
                held_ms = u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX),
                "Lock entry expired or changed hands before release"
            );
        }
        Ok(deleted)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(key = %self.key, "No runtime to release dropped lock; it will expire");
            return;
        };
        let cache = self.cache.clone();
        let key = std::mem::take(&mut self.key);
        let token = std::mem::take(&mut self.token);
        handle.spawn(async move {
            if let Err(e) = cache.compare_and_delete(&key, &token).await {
                warn!(key = %key, error = %e, "Failed to release dropped lock");
            }
        });
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use std::sync::Arc;

    use coursehub_core::config::MemoryCacheConfig;

    use crate::memory::MemoryCacheProvider;

    fn lock_service(ttl: Duration) -> (CourseLock, CacheManager) {
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig::default(),
        )));
        (CourseLock::new(cache.clone(), ttl), cache)
    }

    #[tokio::test]
    async fn test_second_acquire_fails_until_release() {
        let (locks, cache) = lock_service(Duration::from_secs(10));
        let guard = locks.try_acquire(CourseId(1)).await.unwrap().unwrap();
        assert_eq!(guard.key(), "lock:course:1");
        assert!(locks.try_acquire(CourseId(1)).await.unwrap().is_none());
        // Other courses are independent.
        assert!(locks.try_acquire(CourseId(2)).await.unwrap().is_some());

        assert!(guard.release().await.unwrap());
        assert!(!cache.exists("lock:course:1").await.unwrap());
        assert!(locks.try_acquire(CourseId(1)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_release_with_wrong_token_is_noop() {
        let (locks, cache) = lock_service(Duration::from_secs(10));
        assert!(locks.acquire("lock:course:9", "mine", locks.ttl()).await.unwrap());
        assert!(!locks.release("lock:course:9", "theirs").await.unwrap());
        assert_eq!(
            cache.get("lock:course:9").await.unwrap(),
            Some("mine".to_string())
        );
        assert!(locks.release("lock:course:9", "mine").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_holder_cannot_release_new_holder() {
        let (locks, _) = lock_service(Duration::from_millis(100));
        let stale = locks.try_acquire(CourseId(3)).await.unwrap().unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(stale.is_expired());

        let fresh = locks.try_acquire(CourseId(3)).await.unwrap().unwrap();
        assert!(!stale.release().await.unwrap());
        assert!(locks.try_acquire(CourseId(3)).await.unwrap().is_none());
        assert!(fresh.release().await.unwrap());
    }

    #[tokio::test]
    async fn test_dropped_guard_releases_in_background() {
        let (locks, cache) = lock_service(Duration::from_secs(10));
        {
            let _guard = locks.try_acquire(CourseId(4)).await.unwrap().unwrap();
        }
        for _ in 0..50 {
            if !cache.exists("lock:course:4").await.unwrap() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("dropped guard never released its lock");
    }
}
