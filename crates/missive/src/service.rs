//! Command and query operations on messages.
//!
//! Every operation runs in its own unit of work. Validation happens before
//! any I/O. Events of committed changes are dispatched after the unit of work
//! commits; dispatch failures are logged and never undo the stored change.

use std::sync::Arc;

use uuid::Uuid;

use missive_core::events::EventBus;
use missive_core::message::{Message, MessageEvent, MessageText, NewMessage};
use missive_core::storage::{MessageStore, RepositoryError};

use crate::cache::MultiLevelCache;
use crate::error::{Result, ServiceError};
use crate::events::publish_all;
use crate::unit_of_work::UnitOfWork;

/// Input for [`MessageService::create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMessage {
    /// Generated when absent.
    pub id: Option<Uuid>,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub chat_id: Uuid,
    pub text: String,
}

/// Message operations over explicitly injected collaborators.
#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
    cache: MultiLevelCache,
    event_bus: Arc<dyn EventBus>,
}

impl MessageService {
    pub fn new(
        store: Arc<dyn MessageStore>,
        cache: MultiLevelCache,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            store,
            cache,
            event_bus,
        }
    }

    /// Opens a unit of work over this service's store and cache.
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::begin(Arc::clone(&self.store), self.cache.clone())
    }

    /// Creates and persists a new message.
    ///
    /// Fails with `AlreadyExists` when a message with the requested id is
    /// already stored, also when another create for that id wins a race.
    pub async fn create(&self, input: CreateMessage) -> Result<Message> {
        let text = MessageText::parse(input.text)?;
        let mut message = match input.id {
            Some(id) => Message::new(NewMessage {
                id,
                sender_id: input.sender_id,
                recipient_id: input.recipient_id,
                chat_id: input.chat_id,
                text,
                sent_at: None,
            })?,
            None => Message::create(input.sender_id, input.recipient_id, input.chat_id, text)?,
        };

        let uow = self.unit_of_work();
        match uow.messages().add(&mut message).await {
            Ok(()) => {}
            Err(RepositoryError::AlreadyExists { .. }) => {
                return Err(ServiceError::AlreadyExists(message.id()));
            }
            Err(err) => return Err(err.into()),
        }
        let events = uow.commit();

        tracing::debug!(message_id = %message.id(), chat_id = %message.chat_id(), "Message created");
        self.dispatch(events).await;
        Ok(message)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Message> {
        let uow = self.unit_of_work();
        let message = uow.messages().get_by_id(id).await?;
        uow.commit();
        message.ok_or(ServiceError::NotFound(id))
    }

    /// Replaces the text of a stored message.
    pub async fn edit_text(&self, id: Uuid, new_text: &str) -> Result<Message> {
        let text = MessageText::parse(new_text)?;

        let uow = self.unit_of_work();
        let mut message = uow
            .messages()
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        message.edit_text(text)?;
        uow.messages().save(&mut message).await?;
        let events = uow.commit();

        tracing::debug!(message_id = %id, version = message.version(), "Message text edited");
        self.dispatch(events).await;
        Ok(message)
    }

    /// Marks a stored message as read. Already read messages are returned
    /// unchanged without touching the store.
    pub async fn mark_as_read(&self, id: Uuid) -> Result<Message> {
        let uow = self.unit_of_work();
        let mut message = uow
            .messages()
            .get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(id))?;
        message.mark_as_read()?;

        if message.pending_events().is_empty() {
            uow.commit();
            return Ok(message);
        }

        uow.messages().save(&mut message).await?;
        let events = uow.commit();

        tracing::debug!(message_id = %id, "Message marked as read");
        self.dispatch(events).await;
        Ok(message)
    }

    /// Hard-deletes a message. Deleting an unknown id succeeds.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let uow = self.unit_of_work();
        uow.messages().delete(id).await?;
        uow.commit();
        Ok(())
    }

    async fn dispatch(&self, events: Vec<MessageEvent>) {
        // Failures are already logged by publish_all.
        if let Ok(published) = publish_all(self.event_bus.as_ref(), &events).await {
            tracing::trace!(published, "Events dispatched");
        }
    }
}
