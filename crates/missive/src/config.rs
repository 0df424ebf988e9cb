use std::{env, time::Duration};

/// Backend settings for the message store, its cache tiers and event bus.
///
/// Only the fields of the compiled-in backends are read.
#[derive(Debug, Clone)]
pub struct Config {
    /// Lifetime of every message snapshot written to L2, in seconds.
    pub cache_ttl_seconds: u64,
    /// Snapshot capacity of the in-process L2 tier. 0 is treated as 1.
    pub cache_max_entries: usize,
    /// Message database file for the `sqlite` store.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Server shared by the `redis` cache tier and event bus.
    #[allow(dead_code)]
    pub redis_url: String,
}

impl Config {
    /// Reads the settings from the environment.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `CACHE_TTL_SECONDS` | 3600 |
    /// | `CACHE_MAX_ENTRIES` | 10000 (unparsable or 0 falls back too) |
    /// | `SQLITE_PATH` | `missive.db` |
    /// | `REDIS_URL` | `redis://localhost:6379` |
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(10_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "missive.db".to_string()),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
        }
    }

    /// TTL handed to the multi-level cache for L2 writes.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
