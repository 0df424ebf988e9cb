//! Redis pub/sub event bus.
//!
//! Events are published as JSON on one channel per event kind. Each
//! subscription runs its own background task that decodes incoming payloads
//! and feeds them to the handler.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::AsyncCommands;

use missive_core::events::{event_channel, EventBus, EventBusError, EventHandler, EventKind, Result};
use missive_core::message::MessageEvent;

fn publish_failed(err: redis::RedisError) -> EventBusError {
    EventBusError::PublishFailed(err.to_string())
}

/// Redis-backed event bus.
pub struct RedisEventBus {
    client: redis::Client,
}

impl RedisEventBus {
    /// Creates a new Redis event bus.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// # Errors
    ///
    /// Returns `EventBusError::PublishFailed` if no connection can be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(publish_failed)?;

        // Verify connection by getting a connection
        let _ = client
            .get_multiplexed_async_connection()
            .await
            .map_err(publish_failed)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn publish(&self, event: &MessageEvent) -> Result<()> {
        let channel = event_channel(event.kind());

        let payload = serde_json::to_string(event)
            .map_err(|e| EventBusError::Serialization(e.to_string()))?;

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(publish_failed)?;

        conn.publish::<_, _, ()>(&channel, &payload)
            .await
            .map_err(publish_failed)?;

        tracing::trace!(event_id = %event.event_id, channel = %channel, "Event published");
        Ok(())
    }

    /// Subscribes before returning, so events published after this call
    /// reach the handler.
    async fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> Result<()> {
        let channel = event_channel(kind);

        let mut pubsub = self
            .client
            .get_async_pubsub()
            .await
            .map_err(publish_failed)?;
        pubsub.subscribe(&channel).await.map_err(publish_failed)?;

        tokio::spawn(async move {
            run_subscription_loop(pubsub, channel, handler).await;
        });

        Ok(())
    }
}

/// Feeds decoded messages to the handler until the stream ends.
async fn run_subscription_loop(
    mut pubsub: redis::aio::PubSub,
    channel: String,
    handler: Arc<dyn EventHandler>,
) {
    let mut stream = pubsub.on_message();

    while let Some(msg) = stream.next().await {
        let payload: String = match msg.get_payload() {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(channel = %channel, error = %err, "Unreadable pub/sub payload");
                continue;
            }
        };

        match serde_json::from_str::<MessageEvent>(&payload) {
            Ok(event) => {
                if let Err(err) = handler.handle(&event).await {
                    tracing::warn!(
                        event_id = %event.event_id,
                        channel = %channel,
                        error = %err,
                        "Event handler failed"
                    );
                }
            }
            Err(err) => {
                tracing::warn!(channel = %channel, error = %err, "Failed to deserialize event");
            }
        }
    }

    tracing::info!(channel = %channel, "Redis subscription stream ended");
}
