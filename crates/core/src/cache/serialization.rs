//! Conversion between `Message` aggregates and cache snapshot bytes.
//!
//! Snapshots are the JSON encoding of [`MessageRecord`], so a cached value is
//! human-readable and matches the persisted row field for field.

use thiserror::Error;

use crate::message::{Message, MessageRecord};

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value to bytes.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize bytes to a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
    /// The bytes decoded, but describe a message that violates its invariants.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// Serializes a message snapshot to JSON bytes.
pub fn serialize_message(message: &Message) -> Result<Vec<u8>> {
    serde_json::to_vec(&message.to_record())
        .map_err(|e| SerializationError::SerializeFailed(e.to_string()))
}

/// Deserializes JSON bytes into a fresh message instance.
///
/// Malformed bytes and snapshots that fail validation are both rejected;
/// a partially populated message is never returned.
pub fn deserialize_message(bytes: &[u8]) -> Result<Message> {
    let record: MessageRecord = serde_json::from_slice(bytes)
        .map_err(|e| SerializationError::DeserializeFailed(e.to_string()))?;
    Message::from_record(record).map_err(|e| SerializationError::InvalidSnapshot(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{MessageText, NewMessage};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn test_message() -> Message {
        let mut message = Message::new(NewMessage {
            id: Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap(),
            sender_id: Uuid::from_u128(0xA),
            recipient_id: Uuid::from_u128(0xB),
            chat_id: Uuid::from_u128(0xC),
            text: MessageText::parse("hi").unwrap(),
            sent_at: Some(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()),
        })
        .unwrap();
        message.clear_events();
        message
    }

    #[test]
    fn test_roundtrip_message() {
        let message = test_message();

        let bytes = serialize_message(&message).expect("serialize should succeed");
        let deserialized = deserialize_message(&bytes).expect("deserialize should succeed");

        assert_eq!(message, deserialized);
    }

    #[test]
    fn test_snapshot_bytes_are_stable() {
        let mut message = test_message();
        message.mark_as_read().unwrap();
        message.edit_text("hello").unwrap();

        let snapshot = serialize_message(&message).unwrap();
        let again = serialize_message(&deserialize_message(&snapshot).unwrap()).unwrap();

        assert_eq!(snapshot, again);
    }

    #[test]
    fn test_snapshot_excludes_pending_events() {
        let message = test_message();
        let bytes = serialize_message(&message).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(json.get("pending_events").is_none());
        assert_eq!(json["text"], "hi");
        assert_eq!(json["version"], 1);
    }

    #[test]
    fn test_deserialize_malformed_bytes() {
        let result = deserialize_message(b"not valid json");
        assert!(matches!(
            result,
            Err(SerializationError::DeserializeFailed(_))
        ));
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let result = deserialize_message(b"{\"message_id\": \"6ba7b810-9dad-11d1-80b4-00c04fd430c8\"}");
        assert!(matches!(
            result,
            Err(SerializationError::DeserializeFailed(_))
        ));
    }

    #[test]
    fn test_deserialize_invalid_snapshot() {
        let mut record = test_message().to_record();
        record.text = "   ".to_string();
        let bytes = serde_json::to_vec(&record).unwrap();

        let result = deserialize_message(&bytes);
        assert!(matches!(result, Err(SerializationError::InvalidSnapshot(_))));
    }
}
