mod error;
mod keys;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{extract_message_id_from_key, message_key};
pub use serialization::{deserialize_message, serialize_message, SerializationError};
pub use traits::Cache;
