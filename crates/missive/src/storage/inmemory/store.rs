//! In-memory message store implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use missive_core::message::MessageRecord;
use missive_core::storage::{MessageStore, RepositoryError, Result};

/// In-memory system of record.
///
/// Cloning shares the underlying rows. Data is lost when the last clone is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rows: Arc<RwLock<HashMap<Uuid, MessageRecord>>>,
}

impl InMemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.rows.read().await.contains_key(&id))
    }

    async fn insert(&self, record: &MessageRecord) -> Result<()> {
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
        let mut rows = self.rows.write().await;
        match rows.get_mut(&record.message_id) {
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound {
                entity_type: "Message",
                id: record.message_id.to_string(),
            }),
        }
    }

    async fn select_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}
