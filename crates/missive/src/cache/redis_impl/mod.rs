//! Redis cache backend implementation.
//!
//! Provides the distributed cache tier for multi-instance deployments.

mod cache;
mod error;

pub use cache::RedisCache;
