//! Consumer callbacks, one optional handler per change kind.

use crate::diff::model::{Change, ChangeKind};
use crate::identity::ItemKey;

/// Error a callback may return; it is reported, never propagated.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of every callback.
pub type CallbackResult = std::result::Result<(), CallbackError>;

type AddedFn<T> = Box<dyn FnMut(&T, usize) -> CallbackResult>;
type RemovedFn = Box<dyn FnMut(&ItemKey, usize) -> CallbackResult>;
type ChangedFn<T> = Box<dyn FnMut(&ItemKey, &T, &T) -> CallbackResult>;
type MovedFn = Box<dyn FnMut(&ItemKey, usize, usize) -> CallbackResult>;

/// Handlers for the four change kinds. Absent handlers are skipped.
///
/// ```
/// use compobs_core::observer::ObserveCallbacks;
/// use serde_json::Value;
///
/// let callbacks = ObserveCallbacks::<Value>::new()
///     .on_added(|item, index| {
///         println!("added {} at {}", item, index);
///         Ok(())
///     })
///     .on_removed(|key, _index| {
///         println!("removed {}", key);
///         Ok(())
///     });
/// ```
pub struct ObserveCallbacks<T> {
    added: Option<AddedFn<T>>,
    removed: Option<RemovedFn>,
    changed: Option<ChangedFn<T>>,
    moved: Option<MovedFn>,
}

impl<T> ObserveCallbacks<T> {
    pub fn new() -> Self {
        Self {
            added: None,
            removed: None,
            changed: None,
            moved: None,
        }
    }

    /// `added(item, index)`: the item now sits at `index`.
    pub fn on_added(mut self, f: impl FnMut(&T, usize) -> CallbackResult + 'static) -> Self {
        self.added = Some(Box::new(f));
        self
    }

    /// `removed(key, index)`: the item at `index` left the result set.
    pub fn on_removed(
        mut self,
        f: impl FnMut(&ItemKey, usize) -> CallbackResult + 'static,
    ) -> Self {
        self.removed = Some(Box::new(f));
        self
    }

    /// `changed(key, old, new)`: same item, different content.
    pub fn on_changed(
        mut self,
        f: impl FnMut(&ItemKey, &T, &T) -> CallbackResult + 'static,
    ) -> Self {
        self.changed = Some(Box::new(f));
        self
    }

    /// `moved(key, from_index, to_index)`.
    pub fn on_moved(
        mut self,
        f: impl FnMut(&ItemKey, usize, usize) -> CallbackResult + 'static,
    ) -> Self {
        self.moved = Some(Box::new(f));
        self
    }

    pub fn has_handler(&self, kind: ChangeKind) -> bool {
        match kind {
            ChangeKind::Added => self.added.is_some(),
            ChangeKind::Removed => self.removed.is_some(),
            ChangeKind::Changed => self.changed.is_some(),
            ChangeKind::Moved => self.moved.is_some(),
        }
    }

    /// Hand `change` to its handler. `None` when no handler is registered.
    pub(crate) fn dispatch(&mut self, change: &Change<T>) -> Option<CallbackResult> {
        match change {
            Change::Added { index, item, .. } => self.added.as_mut().map(|f| f(item, *index)),
            Change::Removed { key, index } => self.removed.as_mut().map(|f| f(key, *index)),
            Change::Changed { key, old, new, .. } => {
                self.changed.as_mut().map(|f| f(key, old, new))
            }
            Change::Moved {
                key,
                from_index,
                to_index,
            } => self.moved.as_mut().map(|f| f(key, *from_index, *to_index)),
        }
    }
}

impl<T> Default for ObserveCallbacks<T> {
    fn default() -> Self {
        Self::new()
    }
}
