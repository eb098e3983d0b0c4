//! Snapshot diff computation engine.
//!
//! The core entry point is [`diff_snapshots`], which compares two captured
//! [`Snapshot`]s. [`diff`] is the convenience form over plain slices.

use std::collections::HashMap;

use crate::diff::model::{Change, ChangeSet};
use crate::diff::snapshot::Snapshot;
use crate::errors::{ExError, Result};
use crate::identity::{ItemKey, ItemPolicy};

/// Compute the ordered change set between two plain item slices.
///
/// Both slices are captured (keyed and checked for duplicates) first.
///
/// # Errors
///
/// - `Configuration`: an item has no derivable identity
/// - `DuplicateIdentity`: a slice contains the same key twice
pub fn diff<T: Clone>(
    previous: &[T],
    current: &[T],
    policy: &ItemPolicy<T>,
) -> Result<ChangeSet<T>> {
    let previous = Snapshot::capture(previous.to_vec(), policy)
        .map_err(|e| ExError::from(e).with_op("diff"))?;
    let current = Snapshot::capture(current.to_vec(), policy)
        .map_err(|e| ExError::from(e).with_op("diff"))?;
    Ok(diff_snapshots(&previous, &current, policy))
}

/// Compute the ordered change set that turns `previous` into `current`.
///
/// Operations come out grouped as removed, changed, moved, added. Within a
/// group they follow the snapshot that defines them: previous order for
/// removals, current order for the rest.
pub fn diff_snapshots<T: Clone>(
    previous: &Snapshot<T>,
    current: &Snapshot<T>,
    policy: &ItemPolicy<T>,
) -> ChangeSet<T> {
    let mut changes = Vec::new();

    // Removals, in previous order. Each index accounts for the removals
    // applied before it.
    let mut retained: Vec<&ItemKey> = Vec::with_capacity(previous.len());
    for key in previous.keys() {
        if current.contains(key) {
            retained.push(key);
        } else {
            changes.push(Change::Removed {
                key: key.clone(),
                index: retained.len(),
            });
        }
    }

    let retained_positions: HashMap<&ItemKey, usize> = retained
        .iter()
        .enumerate()
        .map(|(position, key)| (*key, position))
        .collect();

    // Content changes, in current order. At this point the mirror holds the
    // retained items in previous order, so that is where they are found.
    let mut common: Vec<&ItemKey> = Vec::with_capacity(retained.len());
    for (index, key) in current.keys().iter().enumerate() {
        let Some(&position) = retained_positions.get(key) else {
            continue;
        };
        common.push(key);

        let Some(old) = previous.get(key) else {
            continue;
        };
        let new = &current.items()[index];
        if !policy.equals(old, new) {
            changes.push(Change::Changed {
                key: key.clone(),
                index: position,
                old: old.clone(),
                new: new.clone(),
            });
        }
    }

    // Moves, in current order.
    let order: Vec<usize> = common
        .iter()
        .filter_map(|key| retained_positions.get(*key).copied())
        .collect();
    let stable = stable_subsequence(&order);
    push_moves(&mut changes, &common, &order, &stable);

    // Additions, in current order, at their final index.
    for (index, key) in current.keys().iter().enumerate() {
        if !previous.contains(key) {
            changes.push(Change::Added {
                key: key.clone(),
                index,
                item: current.items()[index].clone(),
            });
        }
    }

    ChangeSet::from_ordered(changes)
}

/// Emit a move for every retained item off the stable subsequence.
///
/// Each such item, taken in current order, is re-inserted directly after
/// its predecessor in the current order, or at the front when it has none.
/// The slot layout is fixed up front: every retained item has a home slot
/// at its previous position, and every moved item gets a target slot
/// behind its anchor, the nearest stable item before it in current order.
/// A live index is then the count of occupied slots before it.
fn push_moves<T>(
    changes: &mut Vec<Change<T>>,
    common: &[&ItemKey],
    order: &[usize],
    stable: &[bool],
) {
    // Moved positions grouped by anchor (previous position of the stable
    // item they follow). `leading` have no anchor and go to the front.
    let mut leading: Vec<usize> = Vec::new();
    let mut trailing: Vec<Vec<usize>> = vec![Vec::new(); order.len()];
    let mut anchor: Option<usize> = None;
    for (position, &previous) in order.iter().enumerate() {
        if stable[position] {
            anchor = Some(previous);
        } else if let Some(anchor) = anchor {
            trailing[anchor].push(position);
        } else {
            leading.push(position);
        }
    }

    let mut home = vec![0usize; order.len()];
    let mut target = vec![0usize; order.len()];
    let mut next_slot = 0;
    for &position in &leading {
        target[position] = next_slot;
        next_slot += 1;
    }
    for (home_slot, followers) in home.iter_mut().zip(&trailing) {
        *home_slot = next_slot;
        next_slot += 1;
        for &position in followers {
            target[position] = next_slot;
            next_slot += 1;
        }
    }

    let mut slots = SlotCounts::new(next_slot);
    for &slot in &home {
        slots.occupy(slot);
    }
    for (position, key) in common.iter().enumerate() {
        if stable[position] {
            continue;
        }
        let from_slot = home[order[position]];
        let from_index = slots.before(from_slot);
        slots.vacate(from_slot);
        let to_index = slots.before(target[position]);
        slots.occupy(target[position]);

        changes.push(Change::Moved {
            key: (*key).clone(),
            from_index,
            to_index,
        });
    }
}

/// Occupancy counts over a fixed run of slots, kept as a Fenwick tree.
struct SlotCounts {
    tree: Vec<usize>,
}

impl SlotCounts {
    fn new(len: usize) -> Self {
        Self {
            tree: vec![0; len + 1],
        }
    }

    fn occupy(&mut self, slot: usize) {
        let mut i = slot + 1;
        while i < self.tree.len() {
            self.tree[i] += 1;
            i += i & i.wrapping_neg();
        }
    }

    fn vacate(&mut self, slot: usize) {
        let mut i = slot + 1;
        while i < self.tree.len() {
            self.tree[i] -= 1;
            i += i & i.wrapping_neg();
        }
    }

    /// Number of occupied slots strictly before `slot`.
    fn before(&self, slot: usize) -> usize {
        let mut i = slot;
        let mut count = 0;
        while i > 0 {
            count += self.tree[i];
            i &= i - 1;
        }
        count
    }
}

/// Mark the members of a longest increasing subsequence of `order`.
///
/// `order` holds distinct values. Among all longest subsequences the one
/// with the lexicographically smallest positions is chosen, so the items
/// that appear earliest stay stable.
fn stable_subsequence(order: &[usize]) -> Vec<bool> {
    let n = order.len();

    // run_from[i]: length of the longest increasing subsequence starting at i.
    // tails[k]: largest value that starts an increasing run of length k + 1
    // among the suffix scanned so far (strictly decreasing in k).
    let mut run_from = vec![0usize; n];
    let mut tails: Vec<usize> = Vec::new();
    for i in (0..n).rev() {
        let value = order[i];
        let len = tails.partition_point(|&t| t > value);
        if len == tails.len() {
            tails.push(value);
        } else {
            tails[len] = value;
        }
        run_from[i] = len + 1;
    }

    // Leftmost greedy pick: take i whenever it can still start a run that
    // completes the subsequence.
    let mut stable = vec![false; n];
    let mut remaining = tails.len();
    let mut floor: Option<usize> = None;
    for i in 0..n {
        if remaining == 0 {
            break;
        }
        if run_from[i] == remaining && floor.map_or(true, |f| order[i] > f) {
            stable[i] = true;
            floor = Some(order[i]);
            remaining -= 1;
        }
    }
    stable
}
