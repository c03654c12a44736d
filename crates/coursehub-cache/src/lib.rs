//! # coursehub-cache
//!
//! Cache provider implementations for CourseHub, plus the two structures
//! built on them:
//!
//! - [`StockCounter`]: per-course remaining-seat counter
//! - [`CourseLock`]: per-course mutual exclusion with token-checked release
//!
//! Two providers are available, selected at runtime from configuration:
//!
//! - **memory**: in-process cache using [moka](https://crates.io/crates/moka)
//! - **redis**: Redis-backed cache using the [redis](https://crates.io/crates/redis) crate
//!
//! Only the Redis provider gives cross-process exclusion.

pub mod keys;
pub mod lock;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;
pub mod stock;

pub use lock::{CourseLock, LockGuard};
pub use provider::CacheManager;
pub use stock::{SeatHold, StockCounter};
