use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discriminant of a [`MessageEvent`], used to route events to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Sent,
    Read,
    Edited,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Sent, EventKind::Read, EventKind::Edited];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Sent => "sent",
            EventKind::Read => "read",
            EventKind::Edited => "edited",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event-specific data recorded by a state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageEventPayload {
    Sent {
        sender_id: Uuid,
        recipient_id: Uuid,
        chat_id: Uuid,
        sent_at: DateTime<Utc>,
        message_length: usize,
    },
    Read {
        read_at: DateTime<Utc>,
    },
    Edited {
        old_text: String,
        new_text: String,
        edited_at: DateTime<Utc>,
    },
}

/// An immutable fact recorded by a `Message`, queued for publication after commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    /// Aggregate version right after the transition that produced this event.
    pub version: u64,
    pub occurred_at: DateTime<Utc>,
    pub payload: MessageEventPayload,
}

impl MessageEvent {
    pub fn new(aggregate_id: Uuid, version: u64, payload: MessageEventPayload) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            aggregate_id,
            version,
            occurred_at: Utc::now(),
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.payload {
            MessageEventPayload::Sent { .. } => EventKind::Sent,
            MessageEventPayload::Read { .. } => EventKind::Read,
            MessageEventPayload::Edited { .. } => EventKind::Edited,
        }
    }
}
