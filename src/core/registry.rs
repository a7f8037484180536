//! # Cancelable registry.
//!
//! Ordered collection of weak references to registered units.
//!
//! ## Rules
//! - Entries keep insertion order; delivery follows it
//! - At most one entry per identity (idempotent membership)
//! - Entries are never dereferenced under the lock: callers upgrade on a
//!   [`snapshot`](Registry::snapshot), so a unit's destructor (which removes
//!   its own entry) can never run while the lock is held
//! - Expired entries are pruned whenever a snapshot is taken

use parking_lot::Mutex;

use crate::cancel::Cancelable;
use crate::holder::{TargetId, WeakHolder};

pub(crate) type Entry = WeakHolder<dyn Cancelable>;

/// Registry of weakly-held units.
#[derive(Default)]
pub(crate) struct Registry {
    entries: Mutex<Vec<Entry>>,
}

impl Registry {
    /// Appends `entry` unless an entry with the same identity exists.
    ///
    /// Returns `false` for duplicates and empty holders.
    pub(crate) fn insert(&self, entry: Entry) -> bool {
        let Some(id) = entry.id() else {
            return false;
        };
        let mut entries = self.entries.lock();
        if entries.iter().any(|e| e.id() == Some(id)) {
            return false;
        }
        entries.push(entry);
        true
    }

    /// Removes the entry with identity `id`. Returns `true` if it was present.
    pub(crate) fn remove(&self, id: TargetId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| e.id() != Some(id));
        entries.len() != before
    }

    pub(crate) fn contains(&self, id: TargetId) -> bool {
        self.entries.lock().iter().any(|e| e.id() == Some(id))
    }

    /// Prunes expired entries and returns `(live, pruned_ids)`.
    ///
    /// `live` is a copy in registration order; the lock is released before return.
    pub(crate) fn snapshot(&self) -> (Vec<Entry>, Vec<TargetId>) {
        let mut entries = self.entries.lock();
        let mut pruned = Vec::new();
        entries.retain(|e| {
            if e.expired() {
                pruned.extend(e.id());
                false
            } else {
                true
            }
        });
        (entries.clone(), pruned)
    }

    /// Removes and returns all entries.
    pub(crate) fn drain(&self) -> Vec<Entry> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
