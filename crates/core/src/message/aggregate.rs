use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{MessageError, MessageEvent, MessageEventPayload, MessageRecord, MessageText, Result};

/// Input for [`Message::new`] when the caller already knows the message id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub chat_id: Uuid,
    pub text: MessageText,
    /// Defaults to the current time when absent.
    pub sent_at: Option<DateTime<Utc>>,
}

/// The message aggregate.
///
/// Every state transition bumps `version` and may queue a [`MessageEvent`].
/// Queued events stay on the instance until the repository persists it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    id: Uuid,
    sender_id: Uuid,
    recipient_id: Uuid,
    chat_id: Uuid,
    text: MessageText,
    sent_at: DateTime<Utc>,
    read_at: Option<DateTime<Utc>>,
    edited_at: Option<DateTime<Utc>>,
    deleted: bool,
    version: u64,
    pending_events: Vec<MessageEvent>,
}

impl Message {
    /// Creates a message with a caller-supplied id and queues a `Sent` event.
    pub fn new(input: NewMessage) -> Result<Self> {
        validate_participants(input.sender_id, input.recipient_id, input.chat_id)?;

        let mut message = Self {
            id: input.id,
            sender_id: input.sender_id,
            recipient_id: input.recipient_id,
            chat_id: input.chat_id,
            text: input.text,
            sent_at: input.sent_at.unwrap_or_else(Utc::now),
            read_at: None,
            edited_at: None,
            deleted: false,
            version: 1,
            pending_events: Vec::new(),
        };

        let payload = MessageEventPayload::Sent {
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            chat_id: message.chat_id,
            sent_at: message.sent_at,
            message_length: message.text.len(),
        };
        message.record_event(payload);

        Ok(message)
    }

    /// Creates a message with a freshly generated id.
    pub fn create(
        sender_id: Uuid,
        recipient_id: Uuid,
        chat_id: Uuid,
        text: MessageText,
    ) -> Result<Self> {
        Self::new(NewMessage {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            chat_id,
            text,
            sent_at: None,
        })
    }

    /// Rebuilds a message from its persistence shape. No events are queued.
    pub fn from_record(record: MessageRecord) -> Result<Self> {
        let text = MessageText::parse(record.text)?;
        let message = Self {
            id: record.message_id,
            sender_id: record.sender_id,
            recipient_id: record.recipient_id,
            chat_id: record.chat_id,
            text,
            sent_at: record.sent_at,
            read_at: record.read_at,
            edited_at: record.edited_at,
            deleted: false,
            version: record.version,
            pending_events: Vec::new(),
        };
        message.validate_invariants()?;
        Ok(message)
    }

    pub fn to_record(&self) -> MessageRecord {
        MessageRecord {
            message_id: self.id,
            sender_id: self.sender_id,
            recipient_id: self.recipient_id,
            chat_id: self.chat_id,
            text: self.text.as_str().to_string(),
            sent_at: self.sent_at,
            read_at: self.read_at,
            edited_at: self.edited_at,
            version: self.version,
        }
    }

    /// Marks the message as read.
    ///
    /// Calling this on an already read message changes nothing and queues
    /// no event.
    pub fn mark_as_read(&mut self) -> Result<()> {
        if self.deleted {
            return Err(MessageError::CannotReadDeleted);
        }
        if self.read_at.is_some() {
            return Ok(());
        }

        let read_at = Utc::now();
        self.read_at = Some(read_at);
        self.version += 1;
        self.record_event(MessageEventPayload::Read { read_at });
        Ok(())
    }

    /// Replaces the message text. Nothing changes when validation fails.
    pub fn edit_text(&mut self, new_text: impl Into<String>) -> Result<()> {
        if self.deleted {
            return Err(MessageError::CannotEditDeleted);
        }
        let new_text = MessageText::parse(new_text)?;

        let edited_at = Utc::now();
        let old_text = std::mem::replace(&mut self.text, new_text);
        self.edited_at = Some(edited_at);
        self.version += 1;
        self.record_event(MessageEventPayload::Edited {
            old_text: old_text.into(),
            new_text: self.text.as_str().to_string(),
            edited_at,
        });
        Ok(())
    }

    /// Soft-deletes the message in memory. Repeated calls are no-ops.
    ///
    /// A read message cannot be flagged as deleted, since a deleted message
    /// must not carry a read timestamp.
    pub fn delete(&mut self) -> Result<()> {
        if self.deleted {
            return Ok(());
        }
        if self.read_at.is_some() {
            return Err(MessageError::DeletedMessageCannotBeRead);
        }
        self.deleted = true;
        self.version += 1;
        Ok(())
    }

    /// Checks every aggregate invariant.
    pub fn validate_invariants(&self) -> Result<()> {
        validate_participants(self.sender_id, self.recipient_id, self.chat_id)?;
        if self.deleted && self.read_at.is_some() {
            return Err(MessageError::DeletedMessageCannotBeRead);
        }
        Ok(())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn sender_id(&self) -> Uuid {
        self.sender_id
    }

    pub fn recipient_id(&self) -> Uuid {
        self.recipient_id
    }

    pub fn chat_id(&self) -> Uuid {
        self.chat_id
    }

    pub fn text(&self) -> &MessageText {
        &self.text
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    pub fn read_at(&self) -> Option<DateTime<Utc>> {
        self.read_at
    }

    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        self.edited_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    pub fn is_edited(&self) -> bool {
        self.edited_at.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Events queued since the last flush, in emission order.
    pub fn pending_events(&self) -> &[MessageEvent] {
        &self.pending_events
    }

    /// Removes and returns the queued events, leaving the buffer empty.
    pub fn take_events(&mut self) -> Vec<MessageEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }

    fn record_event(&mut self, payload: MessageEventPayload) {
        let event = MessageEvent::new(self.id, self.version, payload);
        self.pending_events.push(event);
    }
}

fn validate_participants(sender_id: Uuid, recipient_id: Uuid, chat_id: Uuid) -> Result<()> {
    if sender_id.is_nil() {
        return Err(MessageError::MissingSenderId);
    }
    if recipient_id.is_nil() {
        return Err(MessageError::MissingRecipientId);
    }
    if chat_id.is_nil() {
        return Err(MessageError::MissingChatId);
    }
    if sender_id == recipient_id {
        return Err(MessageError::SelfAddressed);
    }
    Ok(())
}
