//! Reactive runtime contract.
//!
//! The observer never reads ambient reactive state. It receives a runtime
//! that can register a computation (running it immediately and again on
//! every invalidation), stop it, and accept errors raised inside a run.
//!
//! [`ManualRuntime`] is an in-process implementation whose invalidations
//! are triggered explicitly, for tests and for hosts without a reactive
//! system.

pub mod manual;

use std::rc::Rc;

use crate::errors::ExError;

pub use manual::{ComputationId, ManualRuntime};

/// Host reactive runtime, as seen by the observer.
pub trait ReactiveRuntime {
    /// Run `computation` now and again on every invalidation until the
    /// returned handle is stopped.
    ///
    /// The runtime may invoke the computation re-entrantly, from inside a
    /// previous invocation.
    fn register_computation(&self, computation: Rc<dyn Fn()>) -> Box<dyn ComputationHandle>;

    /// Error channel for failures raised inside a run.
    fn report_error(&self, error: ExError);
}

/// Registration handle returned by [`ReactiveRuntime::register_computation`].
pub trait ComputationHandle {
    /// Deregister. After this returns the runtime must not invoke the
    /// computation again. Stopping twice is a no-op.
    fn stop(&mut self);
}
