//! Application state with explicitly wired collaborators.
//!
//! The system of record, the distributed cache tier and the event bus are
//! constructed once at startup and handed to every component that needs
//! them. Which backends are used is decided by feature flags.

use std::sync::Arc;

use missive_core::cache::Cache;
use missive_core::events::EventBus;
use missive_core::storage::MessageStore;

use crate::cache::MultiLevelCache;
use crate::config::Config;
use crate::service::MessageService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// System of record.
    pub store: Arc<dyn MessageStore>,
    /// Multi-level cache over the distributed tier.
    pub cache: MultiLevelCache,
    /// Event bus committed events are dispatched to.
    pub event_bus: Arc<dyn EventBus>,
}

impl AppState {
    /// Wires the given backends together.
    pub fn build(
        store: Arc<dyn MessageStore>,
        distributed: Arc<dyn Cache>,
        event_bus: Arc<dyn EventBus>,
        config: &Config,
    ) -> Self {
        Self {
            store,
            cache: MultiLevelCache::new(distributed, config.cache_ttl()),
            event_bus,
        }
    }

    /// Message operations over this state's collaborators.
    pub fn service(&self) -> MessageService {
        MessageService::new(
            Arc::clone(&self.store),
            self.cache.clone(),
            Arc::clone(&self.event_bus),
        )
    }
}

// ============================================================================
// Backend combinations
// ============================================================================

#[cfg(all(feature = "inmemory", feature = "memory"))]
mod inmemory_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::events::MemoryEventBus;
    use crate::storage::InMemoryStore;

    impl AppState {
        /// Creates AppState with in-memory storage, cache and event bus.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store = Arc::new(InMemoryStore::new());
            let memory_cache = Arc::new(MemoryCache::new(config.cache_max_entries));
            let event_bus = Arc::new(MemoryEventBus::new());

            tracing::info!(
                ttl_seconds = config.cache_ttl_seconds,
                max_entries = config.cache_max_entries,
                "Using in-memory store and cache"
            );
            Ok(Self::build(store, memory_cache, event_bus, config))
        }
    }
}

#[cfg(all(feature = "inmemory", feature = "redis"))]
mod inmemory_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::events::RedisEventBus;
    use crate::storage::InMemoryStore;

    impl AppState {
        /// Creates AppState with in-memory storage and Redis cache and event bus.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store = Arc::new(InMemoryStore::new());
            let redis_cache = Arc::new(RedisCache::new(&config.redis_url).await?);
            let event_bus = Arc::new(RedisEventBus::new(&config.redis_url).await?);

            tracing::info!(redis_url = %config.redis_url, "Using in-memory store and Redis cache");
            Ok(Self::build(store, redis_cache, event_bus, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "memory"))]
mod sqlite_memory {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::events::MemoryEventBus;
    use crate::storage::SqliteStore;

    impl AppState {
        /// Creates AppState with SQLite storage and in-memory cache and event bus.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store = Arc::new(SqliteStore::new(&config.sqlite_path).await?);
            let memory_cache = Arc::new(MemoryCache::new(config.cache_max_entries));
            let event_bus = Arc::new(MemoryEventBus::new());

            tracing::info!(sqlite_path = %config.sqlite_path, "Using SQLite store and in-memory cache");
            Ok(Self::build(store, memory_cache, event_bus, config))
        }
    }
}

#[cfg(all(feature = "sqlite", feature = "redis"))]
mod sqlite_redis {
    use super::*;
    use crate::cache::RedisCache;
    use crate::events::RedisEventBus;
    use crate::storage::SqliteStore;

    impl AppState {
        /// Creates AppState with SQLite storage and Redis cache and event bus.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let store = Arc::new(SqliteStore::new(&config.sqlite_path).await?);
            let redis_cache = Arc::new(RedisCache::new(&config.redis_url).await?);
            let event_bus = Arc::new(RedisEventBus::new(&config.redis_url).await?);

            tracing::info!(
                sqlite_path = %config.sqlite_path,
                redis_url = %config.redis_url,
                "Using SQLite store and Redis cache"
            );
            Ok(Self::build(store, redis_cache, event_bus, config))
        }
    }
}
