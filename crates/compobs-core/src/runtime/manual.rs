//! Explicitly driven runtime.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::errors::ExError;
use crate::runtime::{ComputationHandle, ReactiveRuntime};

/// Identifier of a computation registered with a [`ManualRuntime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComputationId(u64);

impl ComputationId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct RuntimeState {
    next_id: u64,
    computations: BTreeMap<ComputationId, Rc<dyn Fn()>>,
    errors: Vec<ExError>,
}

/// Runtime whose invalidations are triggered by the caller.
///
/// Clones share the same registry, so a clone can be captured inside a
/// callback to trigger a re-entrant invalidation.
///
/// # Example
///
/// ```
/// use compobs_core::runtime::{ManualRuntime, ReactiveRuntime};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let runtime = ManualRuntime::new();
/// let runs = Rc::new(Cell::new(0));
/// let counter = runs.clone();
/// let mut handle = runtime.register_computation(Rc::new(move || counter.set(counter.get() + 1)));
/// assert_eq!(runs.get(), 1);
///
/// runtime.invalidate_all();
/// assert_eq!(runs.get(), 2);
///
/// handle.stop();
/// runtime.invalidate_all();
/// assert_eq!(runs.get(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ManualRuntime {
    state: Rc<RefCell<RuntimeState>>,
}

impl ManualRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-run every registered computation once, in registration order.
    ///
    /// A computation stopped by an earlier run in the same pass is skipped.
    pub fn invalidate_all(&self) {
        for id in self.computation_ids() {
            self.invalidate(id);
        }
    }

    /// Re-run one computation. Returns `false` if it is not registered.
    pub fn invalidate(&self, id: ComputationId) -> bool {
        let computation = self.state.borrow().computations.get(&id).cloned();
        match computation {
            Some(computation) => {
                tracing::trace!(computation_id = id.value(), "invalidate");
                computation();
                true
            }
            None => false,
        }
    }

    /// Ids of the computations currently registered
    pub fn computation_ids(&self) -> Vec<ComputationId> {
        self.state.borrow().computations.keys().copied().collect()
    }

    pub fn active_count(&self) -> usize {
        self.state.borrow().computations.len()
    }

    /// Errors reported so far (not drained)
    pub fn reported_errors(&self) -> Vec<ExError> {
        self.state.borrow().errors.clone()
    }

    /// Drain the reported errors
    pub fn take_errors(&self) -> Vec<ExError> {
        std::mem::take(&mut self.state.borrow_mut().errors)
    }
}

impl ReactiveRuntime for ManualRuntime {
    fn register_computation(&self, computation: Rc<dyn Fn()>) -> Box<dyn ComputationHandle> {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = ComputationId(state.next_id);
            state.next_id += 1;
            state.computations.insert(id, Rc::clone(&computation));
            id
        };
        tracing::trace!(computation_id = id.value(), "register");

        computation();

        Box::new(ManualHandle {
            id,
            state: Rc::downgrade(&self.state),
        })
    }

    fn report_error(&self, error: ExError) {
        tracing::warn!(err_code = error.code(), "{}", error);
        self.state.borrow_mut().errors.push(error);
    }
}

struct ManualHandle {
    id: ComputationId,
    state: Weak<RefCell<RuntimeState>>,
}

impl ComputationHandle for ManualHandle {
    fn stop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.borrow_mut().computations.remove(&self.id);
        }
    }
}
