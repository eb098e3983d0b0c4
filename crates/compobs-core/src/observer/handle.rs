//! The observer handle and the per-cycle machinery behind it.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Instant;

use compobs_core_types::schema::{OP_DISPATCH, OP_OBSERVE_CYCLE, OP_OBSERVE_START, OP_OBSERVE_STOP};
use compobs_core_types::{CycleId, ObserverId};

use crate::diff::engine::diff_snapshots;
use crate::diff::model::ChangeSet;
use crate::diff::snapshot::Snapshot;
use crate::errors::{CompObsError, ExError, ExErrorKind, Result};
use crate::identity::{Item, ItemPolicy, ObserveOptions};
use crate::observer::callbacks::ObserveCallbacks;
use crate::observer::state::ObserverState;
use crate::runtime::{ComputationHandle, ReactiveRuntime};
use crate::{log_op_end, log_op_error, log_op_start};

type Computation<T> = Box<dyn FnMut() -> Vec<T>>;

fn elapsed_ms(started_at: Instant) -> u64 {
    started_at.elapsed().as_millis() as u64
}

/// Observes a computation that yields an ordered sequence and reports how
/// each new result differs from the previous one.
///
/// The observer owns its registration with the runtime. Dropping it stops
/// observation, so keep it alive for as long as callbacks are wanted.
///
/// # Example
///
/// ```
/// use compobs_core::observer::{ComputationObserver, ObserveCallbacks, ObserverState};
/// use compobs_core::identity::ObserveOptions;
/// use compobs_core::runtime::ManualRuntime;
/// use serde_json::{json, Value};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let source = Rc::new(RefCell::new(vec![json!({ "id": 1 })]));
/// let runtime = ManualRuntime::new();
/// let added = Rc::new(RefCell::new(Vec::new()));
///
/// let log = added.clone();
/// let callbacks = ObserveCallbacks::<Value>::new().on_added(move |item, index| {
///     log.borrow_mut().push((item["id"].clone(), index));
///     Ok(())
/// });
///
/// let reader = source.clone();
/// let observer = ComputationObserver::new(
///     runtime.clone(),
///     move || reader.borrow().clone(),
///     callbacks,
///     ObserveOptions::new(),
/// );
/// observer.start().unwrap();
/// assert_eq!(observer.state(), ObserverState::Started);
///
/// source.borrow_mut().push(json!({ "id": 2 }));
/// runtime.invalidate_all();
///
/// assert_eq!(*added.borrow(), vec![(json!(1), 0), (json!(2), 1)]);
/// observer.stop();
/// ```
pub struct ComputationObserver<T: Item + 'static> {
    inner: Rc<ObserverInner<T>>,
}

/// Weak handle that can stop an observer from inside its own callbacks.
pub struct StopHandle<T: Item + 'static> {
    inner: Weak<ObserverInner<T>>,
}

impl<T: Item + 'static> Clone for StopHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T: Item + 'static> StopHandle<T> {
    /// Stop the observer if it is still alive. Idempotent.
    pub fn stop(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.stop();
        }
    }
}

struct ObserverInner<T: Item + 'static> {
    id: ObserverId,
    runtime: Box<dyn ReactiveRuntime>,
    policy: ItemPolicy<T>,
    computation: RefCell<Computation<T>>,
    callbacks: RefCell<ObserveCallbacks<T>>,
    state: Cell<ObserverState>,
    baseline: RefCell<Snapshot<T>>,
    registration: RefCell<Option<Box<dyn ComputationHandle>>>,
    cycles: Cell<CycleId>,
    in_cycle: Cell<bool>,
    rerun_pending: Cell<bool>,
    starting: Cell<bool>,
    start_error: RefCell<Option<ExError>>,
}

/// Marks a cycle as in flight until dropped.
struct CycleGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> CycleGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

impl<T: Item + 'static> ComputationObserver<T> {
    /// Create an observer in the `Created` state. Nothing runs until
    /// [`start`](Self::start).
    pub fn new(
        runtime: impl ReactiveRuntime + 'static,
        computation: impl FnMut() -> Vec<T> + 'static,
        callbacks: ObserveCallbacks<T>,
        options: ObserveOptions<T>,
    ) -> Self {
        let id = ObserverId::new();
        tracing::debug!(observer_id = %id, "observer created");
        Self {
            inner: Rc::new(ObserverInner {
                id,
                runtime: Box::new(runtime),
                policy: ItemPolicy::from_options(options),
                computation: RefCell::new(Box::new(computation)),
                callbacks: RefCell::new(callbacks),
                state: Cell::new(ObserverState::Created),
                baseline: RefCell::new(Snapshot::empty()),
                registration: RefCell::new(None),
                cycles: Cell::new(CycleId::ZERO),
                in_cycle: Cell::new(false),
                rerun_pending: Cell::new(false),
                starting: Cell::new(false),
                start_error: RefCell::new(None),
            }),
        }
    }

    /// Register with the runtime and run the first cycle.
    ///
    /// The first cycle diffs against an empty baseline, so every initial
    /// item is reported through `added`, in order.
    ///
    /// # Errors
    ///
    /// - `InvalidState`: the observer was already started or stopped
    /// - `Configuration`: the first result holds an item with no
    ///   identity; the observer is stopped and nothing is dispatched
    pub fn start(&self) -> Result<()> {
        self.inner.start()
    }

    /// Stop observing. Idempotent, and safe to call from a callback; no
    /// operation is delivered after it returns.
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn state(&self) -> ObserverState {
        self.inner.state.get()
    }

    pub fn observer_id(&self) -> &ObserverId {
        &self.inner.id
    }

    /// Number of diff cycles run so far, including failed ones.
    pub fn cycles_run(&self) -> u64 {
        self.inner.cycles.get().value()
    }

    /// Length of the sequence last delivered to the callbacks.
    pub fn baseline_len(&self) -> usize {
        self.inner.baseline.borrow().len()
    }

    pub fn stop_handle(&self) -> StopHandle<T> {
        StopHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl<T: Item + 'static> Drop for ComputationObserver<T> {
    fn drop(&mut self) {
        self.inner.stop();
    }
}

impl<T: Item + 'static> ObserverInner<T> {
    fn start(self: &Rc<Self>) -> Result<()> {
        match self.state.get() {
            ObserverState::Created => {}
            ObserverState::Started => {
                return Err(ExError::from(CompObsError::AlreadyStarted)
                    .with_observer_id(self.id.clone()))
            }
            ObserverState::Stopped => {
                return Err(ExError::from(CompObsError::AlreadyStopped)
                    .with_observer_id(self.id.clone()))
            }
        }

        let started_at = Instant::now();
        log_op_start!(OP_OBSERVE_START, observer_id = %self.id);

        self.state.set(ObserverState::Started);
        self.starting.set(true);
        let weak = Rc::downgrade(self);
        let rerun: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_invalidate();
            }
        });
        let registration = self.runtime.register_computation(rerun);
        self.starting.set(false);
        *self.registration.borrow_mut() = Some(registration);

        let start_error = self.start_error.borrow_mut().take();
        if let Some(err) = start_error {
            self.shutdown();
            log_op_error!(
                OP_OBSERVE_START,
                err.clone(),
                duration_ms = elapsed_ms(started_at),
                observer_id = %self.id
            );
            return Err(err);
        }

        // stop() from within the first cycle ran before the registration
        // existed, so release it now.
        if self.state.get() == ObserverState::Stopped {
            self.shutdown();
        }

        log_op_end!(
            OP_OBSERVE_START,
            duration_ms = elapsed_ms(started_at),
            observer_id = %self.id,
            snapshot_len = self.baseline.borrow().len()
        );
        Ok(())
    }

    fn stop(&self) {
        if self.state.get() == ObserverState::Stopped {
            return;
        }
        let was_started = self.state.get() == ObserverState::Started;
        self.shutdown();
        if was_started {
            tracing::info!(
                component = module_path!(),
                op = OP_OBSERVE_STOP,
                observer_id = %self.id,
                cycle = self.cycles.get().value(),
                "observer stopped"
            );
        }
    }

    fn shutdown(&self) {
        self.state.set(ObserverState::Stopped);
        self.rerun_pending.set(false);
        let registration = self.registration.borrow_mut().take();
        if let Some(mut registration) = registration {
            registration.stop();
        }
        *self.baseline.borrow_mut() = Snapshot::empty();
    }

    /// Entry point for every run the runtime schedules.
    ///
    /// A run that arrives while a cycle is in flight is recorded and
    /// replayed once that cycle finishes. Any number of such runs collapse
    /// into one, which sees the latest result.
    fn on_invalidate(&self) {
        if self.state.get() != ObserverState::Started {
            return;
        }
        if self.in_cycle.get() {
            self.rerun_pending.set(true);
            tracing::debug!(observer_id = %self.id, "rerun queued behind in-flight cycle");
            return;
        }

        let _guard = CycleGuard::enter(&self.in_cycle);
        loop {
            self.rerun_pending.set(false);
            self.run_cycle();
            // only the first cycle can fail the start call
            self.starting.set(false);
            if !self.rerun_pending.get() || self.state.get() != ObserverState::Started {
                break;
            }
        }
    }

    fn run_cycle(&self) {
        let cycle = self.cycles.get().next();
        self.cycles.set(cycle);
        let started_at = Instant::now();
        log_op_start!(OP_OBSERVE_CYCLE, observer_id = %self.id, cycle = cycle.value());

        let items = {
            let mut computation = self.computation.borrow_mut();
            (*computation)()
        };
        if self.state.get() != ObserverState::Started {
            tracing::debug!(observer_id = %self.id, cycle = cycle.value(), "stopped during computation");
            log_op_end!(
                OP_OBSERVE_CYCLE,
                duration_ms = elapsed_ms(started_at),
                observer_id = %self.id,
                cycle = cycle.value(),
                change_count = 0usize
            );
            return;
        }

        let snapshot = match Snapshot::capture(items, &self.policy) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.fail_cycle(err, cycle, started_at);
                return;
            }
        };

        let changes = diff_snapshots(&self.baseline.borrow(), &snapshot, &self.policy);
        let counts = changes.counts();
        if !changes.is_empty() {
            self.dispatch(&changes, cycle);
        }

        let snapshot_len = snapshot.len();
        if self.state.get() == ObserverState::Started {
            *self.baseline.borrow_mut() = snapshot;
        }

        log_op_end!(
            OP_OBSERVE_CYCLE,
            duration_ms = elapsed_ms(started_at),
            observer_id = %self.id,
            cycle = cycle.value(),
            snapshot_len = snapshot_len,
            change_count = counts.total()
        );
    }

    /// A result that cannot be keyed. The baseline stays as it was, so the
    /// next valid result is diffed against the last good one.
    fn fail_cycle(&self, err: CompObsError, cycle: CycleId, started_at: Instant) {
        let err = ExError::from(err)
            .with_op(OP_OBSERVE_CYCLE)
            .with_observer_id(self.id.clone());
        log_op_error!(
            OP_OBSERVE_CYCLE,
            err.clone(),
            duration_ms = elapsed_ms(started_at),
            observer_id = %self.id,
            cycle = cycle.value()
        );

        if self.starting.get() && err.kind() == ExErrorKind::Configuration {
            *self.start_error.borrow_mut() = Some(err);
        } else {
            self.runtime.report_error(err);
        }
    }

    fn dispatch(&self, changes: &ChangeSet<T>, cycle: CycleId) {
        let started_at = Instant::now();
        let mut callbacks = self.callbacks.borrow_mut();
        for change in changes {
            if self.state.get() != ObserverState::Started {
                tracing::debug!(
                    observer_id = %self.id,
                    cycle = cycle.value(),
                    "stopped mid-dispatch, dropping remaining operations"
                );
                break;
            }
            let Some(Err(reason)) = callbacks.dispatch(change) else {
                continue;
            };

            let err = ExError::from(CompObsError::CallbackFailed {
                kind: change.kind(),
                key: change.key().clone(),
                reason: reason.to_string(),
            })
            .with_observer_id(self.id.clone());
            log_op_error!(
                OP_DISPATCH,
                err.clone(),
                duration_ms = elapsed_ms(started_at),
                observer_id = %self.id,
                cycle = cycle.value(),
                item_key = %change.key()
            );
            self.runtime.report_error(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ManualRuntime;
    use serde_json::{json, Value};

    fn observer_over(
        runtime: &ManualRuntime,
        source: &Rc<RefCell<Vec<Value>>>,
    ) -> ComputationObserver<Value> {
        let reader = source.clone();
        ComputationObserver::new(
            runtime.clone(),
            move || reader.borrow().clone(),
            ObserveCallbacks::new(),
            ObserveOptions::new(),
        )
    }

    #[test]
    fn test_cycle_guard_resets_flag() {
        let flag = Cell::new(false);
        {
            let _guard = CycleGuard::enter(&flag);
            assert!(flag.get());
        }
        assert!(!flag.get());
    }

    #[test]
    fn test_start_twice_is_invalid_state() {
        let runtime = ManualRuntime::new();
        let source = Rc::new(RefCell::new(vec![json!({ "id": 1 })]));
        let observer = observer_over(&runtime, &source);

        observer.start().unwrap();
        let err = observer.start().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidState);
        assert_eq!(observer.cycles_run(), 1);
    }

    #[test]
    fn test_drop_releases_registration() {
        let runtime = ManualRuntime::new();
        let source = Rc::new(RefCell::new(Vec::new()));
        let observer = observer_over(&runtime, &source);
        observer.start().unwrap();
        assert_eq!(runtime.active_count(), 1);

        drop(observer);
        assert_eq!(runtime.active_count(), 0);
    }

    #[test]
    fn test_stop_clears_baseline() {
        let runtime = ManualRuntime::new();
        let source = Rc::new(RefCell::new(vec![json!({ "id": 1 }), json!({ "id": 2 })]));
        let observer = observer_over(&runtime, &source);
        observer.start().unwrap();
        assert_eq!(observer.baseline_len(), 2);

        observer.stop();
        assert_eq!(observer.baseline_len(), 0);
        assert_eq!(observer.state(), ObserverState::Stopped);
    }
}
