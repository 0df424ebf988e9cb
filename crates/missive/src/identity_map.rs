//! Identity map: the first cache tier, private to one unit of work.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use missive_core::message::Message;

/// Maps a message id to the single live instance for the current unit of work.
///
/// One lock guards the whole map. It is only ever held for the map mutation
/// itself and never across an `.await`. Reads hand out clones; callers that
/// change a message put it back through [`IdentityMap::add`].
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: Mutex<HashMap<Uuid, Message>>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for the message's id.
    pub fn add(&self, message: Message) {
        self.entries().insert(message.id(), message);
    }

    pub fn get(&self, id: Uuid) -> Option<Message> {
        self.entries().get(&id).cloned()
    }

    /// Removes the entry for `id`. Removing an absent id is a no-op.
    pub fn remove(&self, id: Uuid) -> Option<Message> {
        self.entries().remove(&id)
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.entries().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, Message>> {
        // A panic while holding the lock cannot leave the map half-written.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use missive_core::message::{MessageText, NewMessage};
    use std::sync::Arc;

    fn message(id: u128, text: &str) -> Message {
        Message::new(NewMessage {
            id: Uuid::from_u128(id),
            sender_id: Uuid::from_u128(0xA),
            recipient_id: Uuid::from_u128(0xB),
            chat_id: Uuid::from_u128(0xC),
            text: MessageText::parse(text).unwrap(),
            sent_at: None,
        })
        .unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let map = IdentityMap::new();
        let m = message(1, "hi");

        map.add(m.clone());

        assert!(map.contains(m.id()));
        assert_eq!(map.get(m.id()), Some(m));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_add_replaces_existing_entry() {
        let map = IdentityMap::new();
        map.add(message(1, "hi"));
        map.add(message(1, "hello"));

        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get(Uuid::from_u128(1)).unwrap().text().as_str(),
            "hello"
        );
    }

    #[test]
    fn test_get_missing_returns_none() {
        let map = IdentityMap::new();
        assert!(map.get(Uuid::from_u128(42)).is_none());
        assert!(!map.contains(Uuid::from_u128(42)));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let map = IdentityMap::new();
        map.add(message(1, "hi"));

        assert!(map.remove(Uuid::from_u128(2)).is_none());
        assert_eq!(map.len(), 1);

        assert!(map.remove(Uuid::from_u128(1)).is_some());
        assert!(map.remove(Uuid::from_u128(1)).is_none());
        assert!(map.is_empty());
    }

    #[test]
    fn test_clear() {
        let map = IdentityMap::new();
        map.add(message(1, "a"));
        map.add(message(2, "b"));

        map.clear();

        assert!(map.is_empty());
    }

    #[test]
    fn test_concurrent_access_from_threads() {
        let map = Arc::new(IdentityMap::new());
        let handles: Vec<_> = (1..=16u128)
            .map(|i| {
                let map = Arc::clone(&map);
                std::thread::spawn(move || {
                    map.add(message(i, "x"));
                    assert!(map.contains(Uuid::from_u128(i)));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(map.len(), 16);
    }
}
