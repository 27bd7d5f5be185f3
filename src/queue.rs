//! In-memory queue store and per-item state machine.
//!
//! The store owns the ordered list of [`QueueItem`]s. Items keep insertion
//! order for their whole life and are only ever removed all at once by
//! [`QueueStore::clear`].

use chrono::Utc;

use crate::types::{FileRef, ItemId, QueueItem, RemoteState, Status};

/// Ordered collection of queued items
#[derive(Debug)]
pub struct QueueStore {
    items: Vec<QueueItem>,
    next_id: u64,
}

impl Default for QueueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl QueueStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a file; it enters the `Uploading` state with zero progress
    pub fn add(&mut self, file: FileRef) -> ItemId {
        let id = ItemId(self.next_id);
        self.next_id += 1;

        self.items.push(QueueItem {
            id,
            file,
            status: Status::Uploading,
            progress: 0.0,
            remote: RemoteState::Pending,
            added_at: Utc::now(),
        });

        id
    }

    /// Move an item to `status`
    ///
    /// Returns false when the item is unknown or the transition would leave a
    /// terminal state or go backwards. Progress snaps to 100 on `Completed`.
    pub fn update_status(&mut self, id: ItemId, status: Status) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };

        if !item.status.can_transition_to(status) {
            tracing::debug!(
                item_id = %id,
                from = %item.status,
                to = %status,
                "Ignoring status transition"
            );
            return false;
        }

        item.status = status;
        if status == Status::Completed {
            item.progress = 100.0;
        }
        true
    }

    /// Record staging progress for an `Uploading` item
    ///
    /// The value is clamped to [0, 100]. Updates for items in any other state,
    /// and updates that would lower the current progress, are ignored.
    pub fn update_progress(&mut self, id: ItemId, value: f32) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };

        if item.status != Status::Uploading {
            return false;
        }

        let value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 100.0)
        };
        if value < item.progress {
            return false;
        }

        item.progress = value;
        true
    }

    /// Record the remote processing outcome shown for an item
    pub fn set_remote(&mut self, id: ItemId, remote: RemoteState) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.remote = remote;
                true
            }
            None => false,
        }
    }

    /// Remove every item, returning how many were removed
    ///
    /// Identifiers are not reused after a clear.
    pub fn clear(&mut self) -> usize {
        let count = self.items.len();
        self.items.clear();
        count
    }

    /// True iff every item is `Completed` or `Errored` (vacuously true when empty)
    pub fn all_terminal(&self) -> bool {
        self.items.iter().all(|item| item.status.is_terminal())
    }

    /// True iff the store holds items and all of them are `Completed`
    pub fn all_completed(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.status == Status::Completed)
    }

    /// Number of items not yet in a terminal state
    pub fn pending(&self) -> usize {
        self.items
            .iter()
            .filter(|item| !item.status.is_terminal())
            .count()
    }

    /// Look up an item
    pub fn get(&self, id: ItemId) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether a file with this name is queued
    pub fn contains_name(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.file.name == name)
    }

    /// Items in insertion order
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
