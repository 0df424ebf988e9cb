//! Unit of work: the scope of one logical operation.
//!
//! A unit of work owns a fresh [`IdentityMap`] and hands out a repository
//! bound to it. The identity map is cleared when the unit of work is
//! dropped, whether it was committed, rolled back, or abandoned halfway
//! through (including when the enclosing future is cancelled).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use missive_core::message::MessageEvent;
use missive_core::storage::MessageStore;

use crate::cache::MultiLevelCache;
use crate::identity_map::IdentityMap;
use crate::storage::CachedMessageRepository;

/// Events taken from messages the repository persisted in this unit of work.
#[derive(Debug, Default)]
pub struct CommittedEvents {
    events: Mutex<Vec<MessageEvent>>,
}

impl CommittedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends events, keeping their order.
    pub fn extend(&self, events: Vec<MessageEvent>) {
        self.lock().extend(events);
    }

    /// Removes and returns every collected event.
    pub fn drain(&self) -> Vec<MessageEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<MessageEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Scope binding one logical operation to one identity map.
///
/// Units of work must not be nested.
pub struct UnitOfWork {
    identity_map: Arc<IdentityMap>,
    events: Arc<CommittedEvents>,
    messages: CachedMessageRepository,
}

impl UnitOfWork {
    /// Opens a unit of work over the shared store and multi-level cache.
    pub fn begin(store: Arc<dyn MessageStore>, cache: MultiLevelCache) -> Self {
        let identity_map = Arc::new(IdentityMap::new());
        let events = Arc::new(CommittedEvents::new());
        let messages = CachedMessageRepository::new(
            store,
            cache,
            Arc::clone(&identity_map),
            Arc::clone(&events),
        );
        tracing::trace!("Unit of work started");

        Self {
            identity_map,
            events,
            messages,
        }
    }

    /// The repository bound to this unit of work.
    pub fn messages(&self) -> &CachedMessageRepository {
        &self.messages
    }

    pub fn identity_map(&self) -> &IdentityMap {
        &self.identity_map
    }

    /// Ends the unit of work successfully and returns the events of every
    /// message saved in it, in save order.
    ///
    /// Each repository call already committed on its own, so there is
    /// nothing left to flush to the store.
    pub fn commit(self) -> Vec<MessageEvent> {
        let events = self.events.drain();
        tracing::trace!(events = events.len(), "Unit of work committed");
        events
    }

    /// Ends the unit of work, discarding its identity map and collected events.
    pub fn rollback(self) {
        let discarded = self.events.drain();
        self.identity_map.clear();
        tracing::debug!(discarded_events = discarded.len(), "Unit of work rolled back");
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        self.identity_map.clear();
    }
}
