//! Per-message async locks.
//!
//! Serializes the miss-then-populate path of the multi-level cache and the
//! invalidate-write-repopulate path of the repository for a single message
//! id. Different ids never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type LockTable = HashMap<Uuid, Arc<AsyncMutex<()>>>;

/// Registry of one async mutex per message id.
///
/// Entries are created on first use and removed once the last guard for
/// that id is released, so the table only holds ids with in-flight work.
/// Cloning shares the registry.
#[derive(Debug, Clone, Default)]
pub struct KeyLocks {
    table: Arc<Mutex<LockTable>>,
}

/// Exclusive access to one message id. Released on drop.
#[derive(Debug)]
pub struct KeyGuard {
    // Declared before `slot` so the mutex is unlocked before the table
    // entry is checked for removal.
    _guard: OwnedMutexGuard<()>,
    slot: Slot,
}

/// A claim on one table entry, held from before the wait until release.
///
/// Dropping the last claim removes the entry, whether or not the lock was
/// ever acquired.
#[derive(Debug)]
struct Slot {
    id: Uuid,
    table: Arc<Mutex<LockTable>>,
    mutex: Option<Arc<AsyncMutex<()>>>,
}

impl KeyLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds the lock for `id`, then takes it.
    ///
    /// Cancelling the returned future while it waits leaves no entry behind.
    pub async fn lock(&self, id: Uuid) -> KeyGuard {
        let mutex = {
            let mut table = lock_table(&self.table);
            Arc::clone(table.entry(id).or_default())
        };
        let slot = Slot {
            id,
            table: Arc::clone(&self.table),
            mutex: Some(Arc::clone(&mutex)),
        };
        let guard = mutex.lock_owned().await;
        KeyGuard {
            _guard: guard,
            slot,
        }
    }

    /// Number of ids that currently have a holder or a waiter.
    pub fn active(&self) -> usize {
        lock_table(&self.table).len()
    }
}

impl KeyGuard {
    pub fn id(&self) -> Uuid {
        self.slot.id
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        drop(self.mutex.take());

        let mut table = lock_table(&self.table);
        // Only the table's own handle left: nobody holds or waits on it.
        if table
            .get(&self.id)
            .is_some_and(|mutex| Arc::strong_count(mutex) == 1)
        {
            table.remove(&self.id);
        }
    }
}

fn lock_table(table: &Mutex<LockTable>) -> MutexGuard<'_, LockTable> {
    table.lock().unwrap_or_else(PoisonError::into_inner)
}
