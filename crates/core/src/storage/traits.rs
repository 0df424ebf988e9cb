use async_trait::async_trait;
use uuid::Uuid;

use crate::message::MessageRecord;

use super::Result;

/// The system of record for messages.
///
/// Each call commits on its own: a call that returns an error has left the
/// store unchanged.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Returns true when a row with this ID exists.
    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// Inserts a new row. Fails with `AlreadyExists` if the ID is taken.
    async fn insert(&self, record: &MessageRecord) -> Result<()>;

    /// Replaces an existing row. Fails with `NotFound` if the ID is unknown.
    async fn update(&self, record: &MessageRecord) -> Result<()>;

    /// Gets a row by its ID.
    async fn select_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>>;

    /// Deletes a row by its ID, returning whether a row was removed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;
}
