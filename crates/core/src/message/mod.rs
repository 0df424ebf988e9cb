mod aggregate;
mod error;
mod events;
mod record;
mod text;

pub use aggregate::{Message, NewMessage};
pub use error::{MessageError, Result};
pub use events::{EventKind, MessageEvent, MessageEventPayload};
pub use record::MessageRecord;
pub use text::{MessageText, MAX_TEXT_LENGTH};
