//! Publishing committed events.

use missive_core::events::{EventBus, EventBusError};
use missive_core::message::MessageEvent;
use thiserror::Error;

/// Publication stopped partway through a batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Dispatch stopped after {published} event(s): {source}")]
pub struct DispatchError {
    /// Events published before the failure. They are not retried.
    pub published: usize,
    #[source]
    pub source: EventBusError,
}

/// Publishes `events` in order, stopping at the first failure.
///
/// Returns the number of events published. Events after a failing one are
/// dropped; nothing is re-published.
pub async fn publish_all(
    bus: &dyn EventBus,
    events: &[MessageEvent],
) -> Result<usize, DispatchError> {
    for (published, event) in events.iter().enumerate() {
        if let Err(source) = bus.publish(event).await {
            tracing::warn!(
                event_id = %event.event_id,
                message_id = %event.aggregate_id,
                kind = %event.kind(),
                published,
                dropped = events.len() - published,
                error = %source,
                "Event dispatch failed"
            );
            return Err(DispatchError { published, source });
        }
    }
    Ok(events.len())
}
