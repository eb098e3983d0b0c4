//! Computation observer.
//!
//! Wraps a computation that yields an ordered sequence, runs it under a
//! [`ReactiveRuntime`](crate::runtime::ReactiveRuntime), and after every run
//! delivers the difference from the previous result as `removed`, `changed`,
//! `moved` and `added` callbacks.
//!
//! Cycles never overlap. A rerun requested while a cycle is in flight (for
//! example by a callback that writes to the computation's source) is
//! deferred until the cycle has finished and its result has become the new
//! baseline.

pub mod callbacks;
pub mod handle;
pub mod state;

use crate::errors::Result;
use crate::identity::{Item, ObserveOptions};
use crate::runtime::ReactiveRuntime;

pub use callbacks::{CallbackError, CallbackResult, ObserveCallbacks};
pub use handle::{ComputationObserver, StopHandle};
pub use state::ObserverState;

/// Create an observer and start it.
///
/// # Errors
///
/// See [`ComputationObserver::start`].
pub fn observe<T: Item + 'static>(
    runtime: impl ReactiveRuntime + 'static,
    computation: impl FnMut() -> Vec<T> + 'static,
    callbacks: ObserveCallbacks<T>,
    options: ObserveOptions<T>,
) -> Result<ComputationObserver<T>> {
    let observer = ComputationObserver::new(runtime, computation, callbacks, options);
    observer.start()?;
    Ok(observer)
}
