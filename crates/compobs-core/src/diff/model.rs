//! Change operation types.
//!
//! All types implement `Debug, Clone, Serialize, Deserialize, PartialEq`.
//! A [`ChangeSet`] is ephemeral: it is produced and consumed within one
//! dispatch cycle and never retained by the observer.

use serde::{Deserialize, Serialize};

use crate::identity::ItemKey;

/// The four kinds of change, declared in delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Removed,
    Changed,
    Moved,
    Added,
}

impl ChangeKind {
    /// Name of the callback that receives this kind
    pub fn callback_name(&self) -> &'static str {
        match self {
            ChangeKind::Removed => "removed",
            ChangeKind::Changed => "changed",
            ChangeKind::Moved => "moved",
            ChangeKind::Added => "added",
        }
    }
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.callback_name())
    }
}

/// One change operation.
///
/// Indices are apply-time positions: each one is valid for a mirrored
/// sequence that already reflects every earlier operation of the same
/// [`ChangeSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Change<T> {
    /// The item left the result set.
    Removed { key: ItemKey, index: usize },
    /// The item stayed but its content differs.
    Changed {
        key: ItemKey,
        index: usize,
        old: T,
        new: T,
    },
    /// The item's order relative to the retained items changed.
    Moved {
        key: ItemKey,
        from_index: usize,
        to_index: usize,
    },
    /// The item entered the result set at its final position.
    Added { key: ItemKey, index: usize, item: T },
}

impl<T> Change<T> {
    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Removed { .. } => ChangeKind::Removed,
            Change::Changed { .. } => ChangeKind::Changed,
            Change::Moved { .. } => ChangeKind::Moved,
            Change::Added { .. } => ChangeKind::Added,
        }
    }

    pub fn key(&self) -> &ItemKey {
        match self {
            Change::Removed { key, .. }
            | Change::Changed { key, .. }
            | Change::Moved { key, .. }
            | Change::Added { key, .. } => key,
        }
    }
}

/// Per-kind operation counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub removed: usize,
    pub changed: usize,
    pub moved: usize,
    pub added: usize,
}

impl ChangeCounts {
    pub fn total(&self) -> usize {
        self.removed + self.changed + self.moved + self.added
    }
}

/// Ordered change operations between two snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet<T> {
    changes: Vec<Change<T>>,
}

impl<T> ChangeSet<T> {
    /// Wrap operations that are already in delivery order.
    pub fn from_ordered(changes: Vec<Change<T>>) -> Self {
        Self { changes }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Change<T>> {
        self.changes.iter()
    }

    pub fn as_slice(&self) -> &[Change<T>] {
        &self.changes
    }

    pub fn into_vec(self) -> Vec<Change<T>> {
        self.changes
    }

    pub fn counts(&self) -> ChangeCounts {
        let mut counts = ChangeCounts::default();
        for change in &self.changes {
            match change.kind() {
                ChangeKind::Removed => counts.removed += 1,
                ChangeKind::Changed => counts.changed += 1,
                ChangeKind::Moved => counts.moved += 1,
                ChangeKind::Added => counts.added += 1,
            }
        }
        counts
    }
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            changes: Vec::new(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ChangeSet<T> {
    type Item = &'a Change<T>;
    type IntoIter = std::slice::Iter<'a, Change<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl<T> IntoIterator for ChangeSet<T> {
    type Item = Change<T>;
    type IntoIter = std::vec::IntoIter<Change<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}
