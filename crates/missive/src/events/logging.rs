use async_trait::async_trait;

use missive_core::events::{EventHandler, Result};
use missive_core::message::{MessageEvent, MessageEventPayload};

/// Handler that writes every event it receives to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

#[async_trait]
impl EventHandler for LoggingHandler {
    async fn handle(&self, event: &MessageEvent) -> Result<()> {
        match &event.payload {
            MessageEventPayload::Sent {
                chat_id,
                message_length,
                ..
            } => tracing::info!(
                message_id = %event.aggregate_id,
                chat_id = %chat_id,
                length = message_length,
                "Message sent"
            ),
            MessageEventPayload::Read { read_at } => tracing::info!(
                message_id = %event.aggregate_id,
                read_at = %read_at,
                "Message read"
            ),
            MessageEventPayload::Edited { edited_at, .. } => tracing::info!(
                message_id = %event.aggregate_id,
                version = event.version,
                edited_at = %edited_at,
                "Message edited"
            ),
        }
        Ok(())
    }
}
