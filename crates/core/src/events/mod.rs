mod error;
mod traits;

pub use crate::message::EventKind;
pub use error::{EventBusError, Result};
pub use traits::{EventBus, EventHandler};

/// Returns the pub/sub channel name for events of the given kind.
pub fn event_channel(kind: EventKind) -> String {
    format!("events:message:{}", kind)
}
