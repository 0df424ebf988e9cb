use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Client for the distributed cache tier.
///
/// Values are opaque bytes. Implementations make no transactional
/// guarantees; each call stands on its own.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL, replacing any previous value.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value from the cache by key. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;
}
