use uuid::Uuid;

const MESSAGE_PREFIX: &str = "message:";

/// Returns the distributed cache key for a single message snapshot.
pub fn message_key(message_id: Uuid) -> String {
    format!("{}{}", MESSAGE_PREFIX, message_id)
}

/// Extracts the message ID from a cache key, if present.
///
/// # Examples
///
/// ```
/// use missive_core::cache::{extract_message_id_from_key, message_key};
/// use uuid::Uuid;
///
/// let id = Uuid::from_u128(7);
/// assert_eq!(extract_message_id_from_key(&message_key(id)), Some(id));
/// assert_eq!(extract_message_id_from_key("chat:123"), None);
/// ```
pub fn extract_message_id_from_key(key: &str) -> Option<Uuid> {
    let rest = key.strip_prefix(MESSAGE_PREFIX)?;
    Uuid::parse_str(rest).ok()
}
