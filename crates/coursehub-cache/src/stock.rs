//! Per-course remaining-seat counter.
//!
//! The counter is a fast-path mirror of `Course.available_seats`. It is
//! never authoritative; the durable store is. Every mutation is a single
//! atomic cache primitive.

use tracing::{debug, warn};

use coursehub_core::error::AppError;
use coursehub_core::result::AppResult;
use coursehub_core::traits::CacheProvider;
use coursehub_core::types::CourseId;

use crate::keys;
use crate::provider::CacheManager;

/// Stock counter operations over the shared cache.
#[derive(Debug, Clone)]
pub struct StockCounter {
    cache: CacheManager,
}

impl StockCounter {
    /// Create a stock counter over the given cache.
    pub fn new(cache: CacheManager) -> Self {
        Self { cache }
    }

    /// Set the counter to `seats`, overwriting any prior value. The entry
    /// never expires.
    pub async fn initialize(&self, course_id: CourseId, seats: i64) -> AppResult<()> {
        self.cache
            .set_persistent(&keys::course_stock(course_id), &seats.to_string())
            .await?;
        debug!(course_id = %course_id, seats, "Stock counter set");
        Ok(())
    }

    /// Delete the counter entry.
    pub async fn remove(&self, course_id: CourseId) -> AppResult<()> {
        self.cache.delete(&keys::course_stock(course_id)).await
    }

    /// Current value. An absent key reads as zero.
    pub async fn get(&self, course_id: CourseId) -> AppResult<i64> {
        let key = keys::course_stock(course_id);
        match self.cache.get(&key).await? {
            None => Ok(0),
            Some(raw) => raw.trim().parse::<i64>().map_err(|_| {
                warn!(course_id = %course_id, value = %raw, "Stock counter holds a non-integer");
                AppError::cache(format!("Stock counter '{key}' holds a non-integer value"))
            }),
        }
    }

    /// Whether a counter entry exists for the course.
    pub async fn is_initialized(&self, course_id: CourseId) -> AppResult<bool> {
        self.cache.exists(&keys::course_stock(course_id)).await
    }

    /// Atomic decrement by one. May return a negative value; the caller
    /// must compensate.
    pub async fn decrement(&self, course_id: CourseId) -> AppResult<i64> {
        self.cache.decr(&keys::course_stock(course_id)).await
    }

    /// Atomic increment by one.
    pub async fn increment(&self, course_id: CourseId) -> AppResult<i64> {
        self.cache.incr(&keys::course_stock(course_id)).await
    }

    /// Decrement by one and hold the seat until the caller settles it.
    ///
    /// The returned hold gives the seat back when dropped unless
    /// [`SeatHold::commit`] was called.
    pub async fn take(&self, course_id: CourseId) -> AppResult<SeatHold> {
        let remaining = self.decrement(course_id).await?;
        Ok(SeatHold {
            cache: self.cache.clone(),
            course_id,
            remaining,
            settled: false,
        })
    }
}

/// A decremented seat not yet backed by a durable enrollment.
///
/// Settle it with [`SeatHold::commit`] or [`SeatHold::give_back`]. A hold
/// dropped unsettled (cancelled future, panic) spawns the increment onto
/// the current runtime.
#[derive(Debug)]
pub struct SeatHold {
    cache: CacheManager,
    course_id: CourseId,
    remaining: i64,
    settled: bool,
}

impl SeatHold {
    /// Counter value right after the decrement. May be negative.
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Keep the decrement.
    pub fn commit(mut self) {
        self.settled = true;
    }

    /// Undo the decrement now. Returns the counter value afterwards.
    pub async fn give_back(mut self) -> AppResult<i64> {
        self.settled = true;
        self.cache.incr(&keys::course_stock(self.course_id)).await
    }
}

impl Drop for SeatHold {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let course_id = self.course_id;
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(course_id = %course_id, "No runtime to return dropped seat hold; counter stays low");
            return;
        };
        let cache = self.cache.clone();
        handle.spawn(async move {
            match cache.incr(&keys::course_stock(course_id)).await {
                Ok(stock) => debug!(course_id = %course_id, stock, "Dropped seat hold returned"),
                Err(e) => {
                    warn!(course_id = %course_id, error = %e, "Failed to return dropped seat hold")
                }
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

    fn counter() -> (StockCounter, CacheManager) {
        let cache = CacheManager::from_provider(Arc::new(MemoryCacheProvider::new(
            &MemoryCacheConfig::default(),
        )));
        (StockCounter::new(cache.clone()), cache)
    }

    #[tokio::test]
    async fn test_absent_reads_as_zero() {
        let (stock, _) = counter();
        assert_eq!(stock.get(CourseId(1)).await.unwrap(), 0);
        assert!(!stock.is_initialized(CourseId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_initialize_overwrites_and_uses_shared_key() {
        let (stock, cache) = counter();
        stock.initialize(CourseId(3), 30).await.unwrap();
        stock.initialize(CourseId(3), 25).await.unwrap();
        assert_eq!(stock.get(CourseId(3)).await.unwrap(), 25);
        assert_eq!(
            cache.get("course:3:stock").await.unwrap(),
            Some("25".to_string())
        );
    }

    #[tokio::test]
    async fn test_decrement_can_go_negative_and_compensate() {
        let (stock, _) = counter();
        stock.initialize(CourseId(2), 0).await.unwrap();
        assert_eq!(stock.decrement(CourseId(2)).await.unwrap(), -1);
        assert_eq!(stock.increment(CourseId(2)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_committed_hold_keeps_the_seat() {
        let (stock, _) = counter();
        stock.initialize(CourseId(6), 2).await.unwrap();
        let hold = stock.take(CourseId(6)).await.unwrap();
        assert_eq!(hold.remaining(), 1);
        hold.commit();
        tokio::task::yield_now().await;
        assert_eq!(stock.get(CourseId(6)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_give_back_restores_immediately() {
        let (stock, _) = counter();
        stock.initialize(CourseId(7), 0).await.unwrap();
        let hold = stock.take(CourseId(7)).await.unwrap();
        assert_eq!(hold.remaining(), -1);
        assert_eq!(hold.give_back().await.unwrap(), 0);
        assert_eq!(stock.get(CourseId(7)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_dropped_hold_returns_seat_in_background() {
        let (stock, _) = counter();
        stock.initialize(CourseId(8), 3).await.unwrap();
        {
            let _hold = stock.take(CourseId(8)).await.unwrap();
        }
        for _ in 0..50 {
            if stock.get(CourseId(8)).await.unwrap() == 3 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("dropped hold never returned its seat");
    }

    #[tokio::test]
    async fn test_remove() {
        let (stock, _) = counter();
        stock.initialize(CourseId(4), 5).await.unwrap();
        stock.remove(CourseId(4)).await.unwrap();
        assert_eq!(stock.get(CourseId(4)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_garbage_value_is_cache_error() {
        let (stock, cache) = counter();
        cache.set_persistent("course:5:stock", "lots").await.unwrap();
        assert!(stock.get(CourseId(5)).await.is_err());
    }
}
