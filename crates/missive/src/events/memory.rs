//! In-process event bus.
//!
//! Handlers are registered per event kind and invoked in registration
//! order. Every published event is also forwarded on a tokio broadcast
//! channel for observers that want the whole stream.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};

use missive_core::events::{EventBus, EventHandler, EventKind, Result};
use missive_core::message::MessageEvent;

/// Channel capacity for the broadcast stream.
const CHANNEL_CAPACITY: usize = 100;

type Handlers = HashMap<EventKind, Vec<Arc<dyn EventHandler>>>;

/// In-memory event bus.
#[derive(Clone)]
pub struct MemoryEventBus {
    handlers: Arc<RwLock<Handlers>>,
    sender: broadcast::Sender<MessageEvent>,
}

impl MemoryEventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            handlers: Arc::new(RwLock::new(HashMap::new())),
            sender,
        }
    }

    /// Receives every event published after this call, regardless of kind.
    pub fn subscribe_all(&self) -> broadcast::Receiver<MessageEvent> {
        self.sender.subscribe()
    }

    /// Number of handlers registered for `kind`.
    pub async fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .await
            .get(&kind)
            .map_or(0, Vec::len)
    }
}

impl Default for MemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for MemoryEventBus {
    /// Calls every handler for the event's kind, then broadcasts it.
    ///
    /// A failing handler does not stop the others; the first failure is
    /// returned once all of them ran.
    async fn publish(&self, event: &MessageEvent) -> Result<()> {
        let kind = event.kind();
        // Clone the list so no lock is held while handlers run.
        let handlers = self
            .handlers
            .read()
            .await
            .get(&kind)
            .cloned()
            .unwrap_or_default();

        let mut outcome = Ok(());
        for handler in handlers {
            if let Err(err) = handler.handle(event).await {
                tracing::warn!(
                    event_id = %event.event_id,
                    kind = %kind,
                    error = %err,
                    "Event handler failed"
                );
                if outcome.is_ok() {
                    outcome = Err(err);
                }
            }
        }

        // No receivers is fine: nobody is observing the stream.
        let _ = self.sender.send(event.clone());

        tracing::trace!(event_id = %event.event_id, kind = %kind, "Event published");
        outcome
    }

    async fn subscribe(&self, kind: EventKind, handler: Arc<dyn EventHandler>) -> Result<()> {
        self.handlers
            .write()
            .await
            .entry(kind)
            .or_default()
            .push(handler);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use missive_core::events::EventBusError;
    use missive_core::message::MessageEventPayload;
    use std::sync::Mutex;
    use uuid::Uuid;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<(&'static str, u64)>>>,
        fail: bool,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &MessageEvent) -> Result<()> {
            self.log.lock().unwrap().push((self.name, event.version));
            if self.fail {
                return Err(EventBusError::HandlerFailed(self.name.to_string()));
            }
            Ok(())
        }
    }

    fn read_event(version: u64) -> MessageEvent {
        MessageEvent::new(
            Uuid::from_u128(1),
            version,
            MessageEventPayload::Read {
                read_at: chrono::Utc::now(),
            },
        )
    }

    fn recorder(
        name: &'static str,
        log: &Arc<Mutex<Vec<(&'static str, u64)>>>,
        fail: bool,
    ) -> Arc<dyn EventHandler> {
        Arc::new(Recorder {
            name,
            log: Arc::clone(log),
            fail,
        })
    }

    #[tokio::test]
    async fn test_handlers_run_in_registration_order() {
        let bus = MemoryEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(EventKind::Read, recorder("first", &log, false))
            .await
            .unwrap();
        bus.subscribe(EventKind::Read, recorder("second", &log, false))
            .await
            .unwrap();

        bus.publish(&read_event(2)).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec![("first", 2), ("second", 2)]);
        assert_eq!(bus.handler_count(EventKind::Read).await, 2);
    }

    #[tokio::test]
    async fn test_handlers_only_receive_their_kind() {
        let bus = MemoryEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(EventKind::Edited, recorder("edited", &log, false))
            .await
            .unwrap();

        bus.publish(&read_event(2)).await.unwrap();

        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_stop_others() {
        let bus = MemoryEventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        bus.subscribe(EventKind::Read, recorder("broken", &log, true))
            .await
            .unwrap();
        bus.subscribe(EventKind::Read, recorder("healthy", &log, false))
            .await
            .unwrap();

        let result = bus.publish(&read_event(2)).await;

        assert_eq!(
            result,
            Err(EventBusError::HandlerFailed("broken".to_string()))
        );
        assert_eq!(*log.lock().unwrap(), vec![("broken", 2), ("healthy", 2)]);
    }

    #[tokio::test]
    async fn test_subscribe_all_receives_every_event() {
        let bus = MemoryEventBus::new();
        let mut receiver = bus.subscribe_all();
        let event = read_event(3);

        bus.publish(&event).await.unwrap();

        assert_eq!(receiver.recv().await.unwrap(), event);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_succeeds() {
        let bus = MemoryEventBus::new();
        assert!(bus.publish(&read_event(2)).await.is_ok());
    }
}
