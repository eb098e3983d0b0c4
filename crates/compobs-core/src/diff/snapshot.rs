//! Validated, keyed snapshots.
//!
//! A [`Snapshot`] owns a copy of one computation result together with the
//! identity key of every item. Capture fails on items without identity and
//! on duplicate keys, so the differ only ever sees well-formed input.

use std::collections::HashMap;

use crate::errors::CompObsError;
use crate::identity::{ItemKey, ItemPolicy};

/// One ordered, identity-checked result set.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    items: Vec<T>,
    keys: Vec<ItemKey>,
    positions: HashMap<ItemKey, usize>,
}

impl<T> Snapshot<T> {
    /// The empty snapshot (the baseline before the first run).
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            keys: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Key every item and check that keys are unique.
    ///
    /// # Errors
    ///
    /// - `MissingIdentity`: the policy yields no key for an item
    /// - `DuplicateIdentity`: two items share a key
    pub fn capture(
        items: Vec<T>,
        policy: &ItemPolicy<T>,
    ) -> std::result::Result<Self, CompObsError> {
        let mut keys = Vec::with_capacity(items.len());
        let mut positions = HashMap::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let key = policy.key_at(item, index)?;
            if let Some(&first_index) = positions.get(&key) {
                return Err(CompObsError::DuplicateIdentity {
                    key,
                    first_index,
                    second_index: index,
                });
            }
            positions.insert(key.clone(), index);
            keys.push(key);
        }

        Ok(Self {
            items,
            keys,
            positions,
        })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn keys(&self) -> &[ItemKey] {
        &self.keys
    }

    /// Index of `key` in this snapshot
    pub fn position_of(&self, key: &ItemKey) -> Option<usize> {
        self.positions.get(key).copied()
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.positions.contains_key(key)
    }

    pub fn get(&self, key: &ItemKey) -> Option<&T> {
        self.position_of(key).map(|index| &self.items[index])
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self::empty()
    }
}
