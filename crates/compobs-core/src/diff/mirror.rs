//! A locally mirrored ordered collection that applies change operations.
//!
//! The mirror checks every operation against its current contents: keys
//! must sit at the index the operation names, and `added` must not name a
//! key that is already present. [`Mirror::apply_all`] is all-or-nothing, so
//! re-applying a change set to an already updated mirror is rejected and
//! leaves the mirror untouched.

use crate::diff::model::{Change, ChangeSet};
use crate::diff::snapshot::Snapshot;
use crate::errors::CompObsError;
use crate::identity::ItemKey;

type MirrorResult = std::result::Result<(), CompObsError>;

#[derive(Debug, Clone, PartialEq)]
pub struct Mirror<T> {
    entries: Vec<(ItemKey, T)>,
}

impl<T: Clone> Mirror<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Start from an existing snapshot.
    pub fn from_snapshot(snapshot: &Snapshot<T>) -> Self {
        Self {
            entries: snapshot
                .keys()
                .iter()
                .cloned()
                .zip(snapshot.items().iter().cloned())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> Vec<&ItemKey> {
        self.entries.iter().map(|(key, _)| key).collect()
    }

    pub fn items(&self) -> Vec<&T> {
        self.entries.iter().map(|(_, item)| item).collect()
    }

    pub fn get(&self, key: &ItemKey) -> Option<&T> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, item)| item)
    }

    pub fn into_items(self) -> Vec<T> {
        self.entries.into_iter().map(|(_, item)| item).collect()
    }

    fn position_of(&self, key: &ItemKey) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    /// Check that `key` sits at `index`.
    fn expect_at(&self, key: &ItemKey, index: usize) -> MirrorResult {
        match self.entries.get(index) {
            Some((k, _)) if k == key => Ok(()),
            _ => match self.position_of(key) {
                None => Err(CompObsError::MirrorKeyNotFound { key: key.clone() }),
                actual => Err(CompObsError::MirrorIndexMismatch {
                    key: key.clone(),
                    expected: index,
                    actual,
                }),
            },
        }
    }

    /// Apply a single operation.
    ///
    /// # Errors
    ///
    /// - `MirrorKeyExists`: `added` for a key already present
    /// - `MirrorKeyNotFound`: the operation names a key that is absent
    /// - `MirrorIndexMismatch`: the key is not at the named index, or the
    ///   target index is out of range
    ///
    /// On error the mirror is unchanged.
    pub fn apply(&mut self, change: &Change<T>) -> MirrorResult {
        match change {
            Change::Removed { key, index } => {
                self.expect_at(key, *index)?;
                self.entries.remove(*index);
            }
            Change::Changed { key, index, new, .. } => {
                self.expect_at(key, *index)?;
                self.entries[*index].1 = new.clone();
            }
            Change::Moved {
                key,
                from_index,
                to_index,
            } => {
                self.expect_at(key, *from_index)?;
                if *to_index >= self.entries.len() {
                    return Err(CompObsError::MirrorIndexMismatch {
                        key: key.clone(),
                        expected: *to_index,
                        actual: None,
                    });
                }
                let entry = self.entries.remove(*from_index);
                self.entries.insert(*to_index, entry);
            }
            Change::Added { key, index, item } => {
                if self.position_of(key).is_some() {
                    return Err(CompObsError::MirrorKeyExists { key: key.clone() });
                }
                if *index > self.entries.len() {
                    return Err(CompObsError::MirrorIndexMismatch {
                        key: key.clone(),
                        expected: *index,
                        actual: None,
                    });
                }
                self.entries.insert(*index, (key.clone(), item.clone()));
            }
        }
        Ok(())
    }

    /// Apply a whole change set in delivery order, all or nothing.
    ///
    /// # Errors
    ///
    /// The first operation that does not fit; the mirror is left as it was
    /// before the call.
    pub fn apply_all(&mut self, changes: &ChangeSet<T>) -> MirrorResult {
        let before = self.entries.clone();
        for change in changes {
            if let Err(err) = self.apply(change) {
                self.entries = before;
                return Err(err);
            }
        }
        Ok(())
    }
}

impl<T: Clone> Default for Mirror<T> {
    fn default() -> Self {
        Self::new()
    }
}
