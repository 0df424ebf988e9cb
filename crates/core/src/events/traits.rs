use std::sync::Arc;

use async_trait::async_trait;

use crate::message::{EventKind, Message, MessageEvent};

use super::Result;

/// Receives events of the kinds it was subscribed to.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &MessageEvent) -> Result<()>;
}

/// Publishes domain events to subscribers.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publishes a single event.
    async fn publish(&self, event: &MessageEvent) -> Result<()>;

    /// Registers a handler for every future event of `kind`.
    async fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> Result<()>;

    /// Publishes the message's queued events in emission order, then clears them.
    ///
    /// Publication stops at the first failure. The buffer is cleared either
    /// way, so events after the failing one are dropped and events before it
    /// are never published twice. Returns the number of events published.
    async fn process_events(&self, message: &mut Message) -> Result<usize> {
        let mut published = 0;
        let mut outcome = Ok(());
        for event in message.pending_events() {
            if let Err(e) = self.publish(event).await {
                outcome = Err(e);
                break;
            }
            published += 1;
        }
        message.clear_events();
        outcome.map(|()| published)
    }
}
