//! Event bus implementations and dispatch helpers.

mod dispatch;
mod logging;
mod memory;

#[cfg(feature = "redis")]
mod redis_impl;

pub use dispatch::{publish_all, DispatchError};
pub use logging::LoggingHandler;
pub use memory::MemoryEventBus;

#[cfg(feature = "redis")]
pub use redis_impl::RedisEventBus;
