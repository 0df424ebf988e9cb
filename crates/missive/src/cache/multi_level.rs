//! Two-tier message cache.
//!
//! L1 is the [`IdentityMap`] of the calling unit of work, L2 is the shared
//! distributed [`Cache`]. The read path is L1, then L2, then a
//! caller-supplied producer (the system of record) under a per-id lock so
//! that concurrent misses for one id result in a single producer call.
//!
//! L2 failures never fail an operation. A read error or an undecodable
//! snapshot counts as a miss; a failed write or delete is logged and
//! reported through the `bool` return value.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use missive_core::cache::{deserialize_message, message_key, serialize_message, Cache};
use missive_core::message::Message;

use super::locks::{KeyGuard, KeyLocks};
use crate::identity_map::IdentityMap;

/// Coordinates the identity map and the distributed cache tier.
///
/// One instance is shared by every unit of work; each call names the
/// identity map it operates on.
#[derive(Clone)]
pub struct MultiLevelCache {
    distributed: Arc<dyn Cache>,
    ttl: Duration,
    locks: KeyLocks,
}

impl MultiLevelCache {
    /// Creates a multi-level cache over the given distributed tier.
    ///
    /// # Arguments
    ///
    /// * `distributed` - The shared L2 cache client
    /// * `ttl` - Time-to-live applied to every L2 write
    pub fn new(distributed: Arc<dyn Cache>, ttl: Duration) -> Self {
        Self {
            distributed,
            ttl,
            locks: KeyLocks::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Takes the per-id lock used to serialize cache population and
    /// mutations of one message.
    pub async fn lock(&self, id: Uuid) -> KeyGuard {
        self.locks.lock(id).await
    }

    /// Looks the message up in L1, then L2. An L2 hit is copied into L1.
    pub async fn get_message(&self, identity_map: &IdentityMap, id: Uuid) -> Option<Message> {
        if let Some(message) = identity_map.get(id) {
            tracing::trace!(message_id = %id, "Identity map hit");
            return Some(message);
        }

        let key = message_key(id);
        match self.distributed.get(&key).await {
            Ok(Some(bytes)) => match deserialize_message(&bytes) {
                Ok(message) => {
                    tracing::trace!(message_id = %id, "Distributed cache hit");
                    identity_map.add(message.clone());
                    Some(message)
                }
                Err(err) => {
                    tracing::warn!(message_id = %id, error = %err, "Cached snapshot is unreadable");
                    None
                }
            },
            Ok(None) => {
                tracing::trace!(message_id = %id, "Cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(message_id = %id, error = %err, "Distributed cache read failed");
                None
            }
        }
    }

    /// Writes the message to L1, then its snapshot to L2 with the fixed TTL.
    ///
    /// L1 is always updated. Returns whether the L2 write succeeded.
    pub async fn set_message(&self, identity_map: &IdentityMap, message: &Message) -> bool {
        let mut cached = message.clone();
        cached.clear_events();
        identity_map.add(cached);

        let id = message.id();
        let bytes = match serialize_message(message) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(message_id = %id, error = %err, "Failed to serialize message");
                return false;
            }
        };

        match self
            .distributed
            .set(&message_key(id), &bytes, Some(self.ttl))
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(message_id = %id, error = %err, "Failed to cache message");
                false
            }
        }
    }

    /// Removes the message from L1 and deletes it from L2.
    ///
    /// Returns whether the L2 delete succeeded.
    pub async fn invalidate_message(&self, identity_map: &IdentityMap, id: Uuid) -> bool {
        identity_map.remove(id);

        match self.distributed.delete(&message_key(id)).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(message_id = %id, error = %err, "Failed to invalidate cached message");
                false
            }
        }
    }

    /// Cache-aside read.
    ///
    /// Tries both tiers; on a miss takes the per-id lock, probes again, and
    /// only then calls `producer`. A produced message populates both tiers
    /// before it is returned. Producer errors are returned unchanged.
    pub async fn get_with_fallback<F, Fut, E>(
        &self,
        identity_map: &IdentityMap,
        id: Uuid,
        producer: F,
    ) -> Result<Option<Message>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<Message>, E>>,
    {
        if let Some(message) = self.get_message(identity_map, id).await {
            return Ok(Some(message));
        }

        let _guard = self.lock(id).await;

        // Another task may have populated the cache while we waited.
        if let Some(message) = self.get_message(identity_map, id).await {
            return Ok(Some(message));
        }

        let produced = producer().await?;
        if let Some(message) = &produced {
            self.set_message(identity_map, message).await;
        }
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_message, stored_message, MockCache};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(3600);

    fn setup() -> (Arc<MockCache>, MultiLevelCache) {
        let l2 = Arc::new(MockCache::new());
        let cache = MultiLevelCache::new(l2.clone(), TTL);
        (l2, cache)
    }

    #[tokio::test]
    async fn test_get_prefers_identity_map() {
        let (l2, cache) = setup();
        let map = IdentityMap::new();
        let message = stored_message(1, "hi");
        map.add(message.clone());

        let result = cache.get_message(&map, message.id()).await;

        assert_eq!(result, Some(message));
        assert_eq!(l2.get_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_falls_back_to_distributed_tier_and_fills_l1() {
        let (l2, cache) = setup();
        let message = stored_message(1, "hi");
        l2.insert_raw(
            &message_key(message.id()),
            &serialize_message(&message).unwrap(),
        )
        .await;
        let map = IdentityMap::new();

        let result = cache.get_message(&map, message.id()).await;

        assert_eq!(result, Some(message.clone()));
        assert!(map.contains(message.id()));
    }

    #[tokio::test]
    async fn test_get_miss_on_both_tiers() {
        let (_l2, cache) = setup();
        let map = IdentityMap::new();

        assert!(cache.get_message(&map, Uuid::from_u128(9)).await.is_none());
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_snapshot_is_a_miss() {
        let (l2, cache) = setup();
        let id = Uuid::from_u128(1);
        l2.insert_raw(&message_key(id), b"{not json").await;
        let map = IdentityMap::new();

        assert!(cache.get_message(&map, id).await.is_none());
        assert!(!map.contains(id));
    }

    #[tokio::test]
    async fn test_distributed_read_failure_is_a_miss() {
        let l2 = Arc::new(MockCache::failing());
        let cache = MultiLevelCache::new(l2, TTL);
        let map = IdentityMap::new();

        assert!(cache.get_message(&map, Uuid::from_u128(1)).await.is_none());
    }

    #[tokio::test]
    async fn test_set_writes_both_tiers_with_ttl() {
        let (l2, cache) = setup();
        let map = IdentityMap::new();
        let message = new_message(1, "hi");

        assert!(cache.set_message(&map, &message).await);

        let cached = map.get(message.id()).unwrap();
        assert!(cached.pending_events().is_empty());
        assert!(l2.contains(&message_key(message.id())).await);
        assert_eq!(*l2.ttls.read().await, vec![Some(TTL)]);
    }

    #[tokio::test]
    async fn test_set_keeps_l1_when_distributed_write_fails() {
        let l2 = Arc::new(MockCache::failing());
        let cache = MultiLevelCache::new(l2, TTL);
        let map = IdentityMap::new();
        let message = stored_message(1, "hi");

        assert!(!cache.set_message(&map, &message).await);
        assert_eq!(map.get(message.id()), Some(message));
    }

    #[tokio::test]
    async fn test_invalidate_clears_both_tiers() {
        let (l2, cache) = setup();
        let map = IdentityMap::new();
        let message = stored_message(1, "hi");
        cache.set_message(&map, &message).await;

        assert!(cache.invalidate_message(&map, message.id()).await);

        assert!(!map.contains(message.id()));
        assert!(!l2.contains(&message_key(message.id())).await);
    }

    #[tokio::test]
    async fn test_invalidate_clears_l1_when_distributed_delete_fails() {
        let l2 = Arc::new(MockCache::failing());
        let cache = MultiLevelCache::new(l2, TTL);
        let map = IdentityMap::new();
        map.add(stored_message(1, "hi"));

        assert!(!cache.invalidate_message(&map, Uuid::from_u128(1)).await);
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_fallback_populates_on_miss() {
        let (l2, cache) = setup();
        let map = IdentityMap::new();
        let message = stored_message(1, "hi");
        let calls = AtomicUsize::new(0);
        let (counter, produced) = (&calls, &message);

        let result: Result<_, ()> = cache
            .get_with_fallback(&map, message.id(), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Some(produced.clone()))
            })
            .await;

        assert_eq!(result, Ok(Some(message.clone())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(map.contains(message.id()));
        assert!(l2.contains(&message_key(message.id())).await);
    }

    #[tokio::test]
    async fn test_fallback_skips_producer_on_hit() {
        let (_l2, cache) = setup();
        let map = IdentityMap::new();
        let message = stored_message(1, "hi");
        map.add(message.clone());
        let calls = AtomicUsize::new(0);
        let counter = &calls;

        let result: Result<_, ()> = cache
            .get_with_fallback(&map, message.id(), move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
            .await;

        assert_eq!(result, Ok(Some(message)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_absent_does_not_populate() {
        let (l2, cache) = setup();
        let map = IdentityMap::new();

        let result: Result<_, ()> = cache
            .get_with_fallback(&map, Uuid::from_u128(1), || async { Ok(None) })
            .await;

        assert_eq!(result, Ok(None));
        assert!(map.is_empty());
        assert_eq!(l2.set_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_propagates_producer_error() {
        let (_l2, cache) = setup();
        let map = IdentityMap::new();

        let result = cache
            .get_with_fallback(&map, Uuid::from_u128(1), || async { Err("store down") })
            .await;

        assert_eq!(result, Err("store down"));
    }

    #[tokio::test]
    async fn test_concurrent_misses_call_producer_once() {
        let (l2, cache) = setup();
        let message = stored_message(1, "hi");
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let cache = cache.clone();
            let message = message.clone();
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                // Each task runs in its own unit of work.
                let map = IdentityMap::new();
                let (counter, produced) = (&calls, &message);
                let result: Result<_, ()> = cache
                    .get_with_fallback(&map, message.id(), move || async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok(Some(produced.clone()))
                    })
                    .await;
                result.unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), Some(message.clone()));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(l2.set_calls.load(Ordering::SeqCst), 1);
    }
}
