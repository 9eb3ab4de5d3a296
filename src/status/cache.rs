//! Status cache and change detection.
//!
//! The cache holds exactly one snapshot at a time and swaps it wholesale, so
//! readers only ever see a complete result of some earlier query.

use log::debug;
use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use super::model::{InstanceStatus, StatusSnapshot};

/// Differences between two snapshots
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
    pub count_changed: bool,
}

impl ChangeSet {
    pub fn is_changed(&self) -> bool {
        self.count_changed
            || !self.added.is_empty()
            || !self.removed.is_empty()
            || !self.modified.is_empty()
    }
}

/// Compare the cached snapshot against a freshly fetched one.
///
/// Ids are diffed in both directions, so a removal paired with an addition is
/// reported even though the instance count stays the same.
pub fn detect_changes(old: &StatusSnapshot, new: &StatusSnapshot) -> ChangeSet {
    let mut changes = ChangeSet {
        count_changed: old.len() != new.len(),
        ..Default::default()
    };

    for status in new.iter() {
        match old.get(&status.id) {
            None => changes.added.push(status.id.clone()),
            Some(previous) if !previous.same_state(status) => {
                changes.modified.push(status.id.clone())
            }
            Some(_) => {}
        }
    }

    let new_ids: HashSet<&str> = new.ids().collect();
    changes.removed = old
        .ids()
        .filter(|id| !new_ids.contains(id))
        .map(str::to_string)
        .collect();

    // Stable order for logs and comparisons.
    changes.added.sort();
    changes.removed.sort();
    changes.modified.sort();
    changes
}

/// Most recent snapshot of every known instance
#[derive(Debug, Default)]
pub struct StatusCache {
    current: RwLock<Arc<StatusSnapshot>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cheap handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Status for `id`, or a placeholder carrying only the id.
    pub fn get_status(&self, id: &str) -> InstanceStatus {
        self.snapshot()
            .get(id)
            .cloned()
            .unwrap_or_else(|| InstanceStatus::placeholder(id))
    }

    /// Ids of all known instances, in no particular order.
    pub fn list(&self) -> Vec<String> {
        self.snapshot().ids().map(str::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Replace the cached snapshot and report what differs from the old one.
    ///
    /// The swap happens whether or not anything changed.
    pub fn apply(&self, fresh: StatusSnapshot) -> ChangeSet {
        let fresh = Arc::new(fresh);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        let changes = detect_changes(&guard, &fresh);
        *guard = fresh;
        drop(guard);

        debug!(
            "Status cache updated: added={:?} removed={:?} modified={:?}",
            changes.added, changes.removed, changes.modified
        );
        changes
    }
}
