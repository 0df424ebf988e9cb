//! Shared fixtures and hand-written mocks for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use missive_core::cache::{Cache, CacheError, Result as CacheResult};
use missive_core::message::{Message, MessageRecord, MessageText, NewMessage};
use missive_core::storage::{MessageStore, RepositoryError, Result};

pub fn sender() -> Uuid {
    Uuid::from_u128(0xA)
}

pub fn recipient() -> Uuid {
    Uuid::from_u128(0xB)
}

pub fn chat() -> Uuid {
    Uuid::from_u128(0xC)
}

/// A fresh message with its `Sent` event still queued.
pub fn new_message(id: u128, text: &str) -> Message {
    Message::new(NewMessage {
        id: Uuid::from_u128(id),
        sender_id: sender(),
        recipient_id: recipient(),
        chat_id: chat(),
        text: MessageText::parse(text).unwrap(),
        sent_at: None,
    })
    .unwrap()
}

/// A message as it would come back from a store: no queued events.
pub fn stored_message(id: u128, text: &str) -> Message {
    let mut message = new_message(id, text);
    message.clear_events();
    message
}

/// Cache backed by a HashMap, with switches to make every call fail.
#[derive(Default)]
pub struct MockCache {
    pub store: RwLock<HashMap<String, Vec<u8>>>,
    pub fail_get: AtomicBool,
    pub fail_set: AtomicBool,
    pub fail_delete: AtomicBool,
    pub get_calls: AtomicUsize,
    pub set_calls: AtomicUsize,
    pub ttls: RwLock<Vec<Option<Duration>>>,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let cache = Self::default();
        cache.fail_get.store(true, Ordering::SeqCst);
        cache.fail_set.store(true, Ordering::SeqCst);
        cache.fail_delete.store(true, Ordering::SeqCst);
        cache
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.store.read().await.contains_key(key)
    }

    pub async fn insert_raw(&self, key: &str, value: &[u8]) {
        self.store
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
    }
}

#[async_trait]
impl Cache for MockCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionFailed("connection refused".to_string()));
        }
        Ok(self.store.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> CacheResult<()> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionFailed("connection refused".to_string()));
        }
        self.ttls.write().await.push(ttl);
        self.store
            .write()
            .await
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(CacheError::ConnectionFailed("connection refused".to_string()));
        }
        self.store.write().await.remove(key);
        Ok(())
    }
}

/// Store that counts calls, can be slowed down, and can be told to fail.
///
/// `insert` rejects ids that already have a row, like the real stores.
#[derive(Default)]
pub struct MockStore {
    pub rows: RwLock<HashMap<Uuid, MessageRecord>>,
    pub select_calls: AtomicUsize,
    pub insert_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
    pub select_delay: Option<Duration>,
    pub write_delay: Option<Duration>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_select_delay(delay: Duration) -> Self {
        Self {
            select_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn with_write_delay(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }

    pub async fn put(&self, message: &Message) {
        self.rows
            .write()
            .await
            .insert(message.id(), message.to_record());
    }

    pub async fn row(&self, id: Uuid) -> Option<MessageRecord> {
        self.rows.read().await.get(&id).cloned()
    }

    async fn check_writes(&self) -> Result<()> {
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::QueryFailed("disk I/O error".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl MessageStore for MockStore {
    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.rows.read().await.contains_key(&id))
    }

    async fn insert(&self, record: &MessageRecord) -> Result<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writes().await?;
        let mut rows = self.rows.write().await;
        if rows.contains_key(&record.message_id) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: "Message",
                id: record.message_id.to_string(),
            });
        }
        rows.insert(record.message_id, record.clone());
        Ok(())
    }

    async fn update(&self, record: &MessageRecord) -> Result<()> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_writes().await?;
        self.rows
            .write()
            .await
            .insert(record.message_id, record.clone());
        Ok(())
    }

    async fn select_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.select_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::ConnectionFailed("database is locked".to_string()));
        }
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        self.check_writes().await?;
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}
