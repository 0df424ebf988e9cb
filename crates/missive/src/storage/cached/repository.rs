//! Cached message repository.
//!
//! Wraps a `MessageStore` with the multi-level cache protocol:
//! - **Reads**: identity map, then distributed cache, then the store under a
//!   per-id lock, repopulating both tiers on a store hit
//! - **Writes**: under the same per-id lock, invalidate both tiers, persist,
//!   then repopulate them with the persisted snapshot

use std::sync::Arc;

use uuid::Uuid;

use missive_core::message::Message;
use missive_core::storage::{MessageStore, RepositoryError, Result};

use crate::cache::MultiLevelCache;
use crate::identity_map::IdentityMap;
use crate::unit_of_work::CommittedEvents;

/// Repository bound to one unit of work.
///
/// Built by [`crate::unit_of_work::UnitOfWork::begin`]; the identity map and
/// the committed-events buffer belong to that unit of work.
pub struct CachedMessageRepository {
    store: Arc<dyn MessageStore>,
    cache: MultiLevelCache,
    identity_map: Arc<IdentityMap>,
    events: Arc<CommittedEvents>,
}

impl CachedMessageRepository {
    /// Creates a cached repository.
    ///
    /// # Arguments
    ///
    /// * `store` - The system of record
    /// * `cache` - The shared multi-level cache
    /// * `identity_map` - The unit of work's identity map
    /// * `events` - Where events of persisted messages are collected
    pub fn new(
        store: Arc<dyn MessageStore>,
        cache: MultiLevelCache,
        identity_map: Arc<IdentityMap>,
        events: Arc<CommittedEvents>,
    ) -> Self {
        Self {
            store,
            cache,
            identity_map,
            events,
        }
    }

    /// Persists a message that must not exist yet.
    ///
    /// The existence check and the insert run under the same per-id lock, so
    /// two concurrent adds of one id resolve to one insert and one
    /// `AlreadyExists`. A conflict leaves both cache tiers untouched.
    pub async fn add(&self, message: &mut Message) -> Result<()> {
        validate(message)?;

        let id = message.id();
        let _guard = self.cache.lock(id).await;

        if self.store.exists(id).await? {
            return Err(already_exists(id));
        }
        self.write(message, Write::Insert).await
    }

    /// Persists the message.
    ///
    /// Insert or update is decided by asking the store, never the cache. On
    /// success the pending events move to the unit of work. On failure the
    /// cache entry is dropped again and the events stay on the message.
    pub async fn save(&self, message: &mut Message) -> Result<()> {
        validate(message)?;

        let _guard = self.cache.lock(message.id()).await;
        self.write(message, Write::Upsert).await
    }

    /// Gets a message by id, falling back to the store on a cache miss.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Message>> {
        let store = &self.store;
        self.cache
            .get_with_fallback(&self.identity_map, id, move || async move {
                tracing::trace!(message_id = %id, "Loading message from store");
                match store.select_by_id(id).await? {
                    Some(record) => Message::from_record(record)
                        .map(Some)
                        .map_err(|err| RepositoryError::InvalidData(err.to_string())),
                    None => Ok(None),
                }
            })
            .await
    }

    /// Hard-deletes the message, returning whether a row existed.
    ///
    /// Both cache tiers are invalidated whether or not the row existed, and
    /// also when the store call fails.
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let _guard = self.cache.lock(id).await;

        let result = self.store.delete_by_id(id).await;
        self.cache.invalidate_message(&self.identity_map, id).await;

        match &result {
            Ok(existed) => tracing::debug!(message_id = %id, existed, "Message deleted"),
            Err(err) => tracing::error!(message_id = %id, error = %err, "Failed to delete message"),
        }
        result
    }

    /// Invalidate, persist, repopulate. Callers hold the per-id lock.
    async fn write(&self, message: &mut Message, mode: Write) -> Result<()> {
        let id = message.id();

        // 1. Invalidate so no reader sees a value about to be overwritten
        self.cache.invalidate_message(&self.identity_map, id).await;

        // 2. Persist to storage
        if let Err(err) = self.persist(message, mode).await {
            tracing::error!(message_id = %id, error = %err, "Failed to save message");
            self.cache.invalidate_message(&self.identity_map, id).await;
            return Err(err);
        }

        // 3. Repopulate both tiers with the committed snapshot
        self.cache.set_message(&self.identity_map, message).await;

        let events = message.take_events();
        tracing::debug!(
            message_id = %id,
            version = message.version(),
            events = events.len(),
            "Message saved"
        );
        self.events.extend(events);
        Ok(())
    }

    async fn persist(&self, message: &Message, mode: Write) -> Result<()> {
        let record = message.to_record();
        match mode {
            Write::Insert => self.store.insert(&record).await,
            Write::Upsert if self.store.exists(record.message_id).await? => {
                self.store.update(&record).await
            }
            Write::Upsert => self.store.insert(&record).await,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Write {
    Insert,
    Upsert,
}

fn validate(message: &Message) -> Result<()> {
    message
        .validate_invariants()
        .map_err(|err| RepositoryError::InvalidData(err.to_string()))
}

fn already_exists(id: Uuid) -> RepositoryError {
    RepositoryError::AlreadyExists {
        entity_type: "Message",
        id: id.to_string(),
    }
}
