//! Core traits defined in `coursehub-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
