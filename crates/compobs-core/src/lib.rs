//! compobs-core - observe a reactive computation and diff its results
//!
//! This crate provides:
//! - Item identity and equality policy ([`identity`])
//! - A snapshot differ that yields ordered change operations with
//!   apply-time indices and minimal moves ([`diff`])
//! - The observer that drives diff cycles from a host runtime and delivers
//!   changes to callbacks ([`observer`])
//! - The runtime seam and an explicitly driven runtime ([`runtime`])
//! - Structured logging built on `tracing` ([`logging_facility`])

pub mod diff;
pub mod errors;
pub mod identity;
pub mod logging_facility;
pub mod observer;
pub mod runtime;

pub use compobs_core_types::schema;

// Re-export commonly used types
pub use diff::{diff, diff_snapshots, Change, ChangeKind, ChangeSet, Mirror, Snapshot};
pub use errors::{CompObsError, ExError, ExErrorKind, Result};
pub use identity::{Item, ItemKey, ItemPolicy, ObserveOptions};
pub use observer::{
    observe, CallbackResult, ComputationObserver, ObserveCallbacks, ObserverState, StopHandle,
};
pub use runtime::{ComputationHandle, ManualRuntime, ReactiveRuntime};
