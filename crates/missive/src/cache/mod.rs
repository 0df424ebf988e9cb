//! Cache tiers and the multi-level protocol that coordinates them.
//!
//! The distributed tier is a concrete implementation of
//! `missive_core::cache::Cache`, selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `memory` (default): in-process LRU cache standing in for the shared tier
//! - `redis`: Redis cache using the redis crate
//!
//! These features are mutually exclusive - only one cache backend can be
//! enabled at a time.

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!(
    "Features 'memory' and 'redis' are mutually exclusive. \
    Enable only one cache backend at a time."
);

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!(
    "No cache backend selected. Enable 'memory' or 'redis' feature. \
    Example: cargo build -p missive --features memory"
);

mod locks;
mod multi_level;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

pub use locks::KeyLocks;
pub use multi_level::MultiLevelCache;

#[cfg(feature = "memory")]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;
