//! Operation boundary macros for observer start, cycles and dispatch.
//!
//! Every operation logs one `start` event and exactly one of `end` or
//! `end_error`, with `op` taken from the `OP_*` names in
//! [`schema`](crate::schema). Extra fields follow the schema keys, so an
//! observer's whole history can be filtered on `observer_id` and each
//! cycle on `cycle`.

/// Log the start of an operation.
///
/// # Example
///
/// ```
/// # use compobs_core::log_op_start;
/// use compobs_core::schema::{OP_OBSERVE_CYCLE, OP_OBSERVE_START};
/// use compobs_core_types::{CycleId, ObserverId};
///
/// let observer_id = ObserverId::new();
/// log_op_start!(OP_OBSERVE_START, observer_id = %observer_id);
///
/// let cycle = CycleId::ZERO.next();
/// log_op_start!(OP_OBSERVE_CYCLE, observer_id = %observer_id, cycle = cycle.value());
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation.
///
/// # Example
///
/// ```
/// # use compobs_core::log_op_end;
/// use compobs_core::diff::diff;
/// use compobs_core::schema::OP_OBSERVE_CYCLE;
/// use compobs_core::ItemPolicy;
/// use serde_json::json;
///
/// let changes = diff(&[json!({ "id": 1 })], &[json!({ "id": 2 })], &ItemPolicy::new()).unwrap();
/// log_op_end!(
///     OP_OBSERVE_CYCLE,
///     duration_ms = 3u64,
///     snapshot_len = 1usize,
///     change_count = changes.counts().total()
/// );
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log the failed end of an operation.
///
/// # Example
///
/// `err` is anything that converts into [`ExError`](crate::errors::ExError);
/// its kind and stable code land in `err.kind` and `err.code`.
///
/// ```
/// # use compobs_core::{log_op_error, errors::CompObsError};
/// use compobs_core::schema::OP_OBSERVE_CYCLE;
///
/// // an item at index 2 had no identity, so the cycle is abandoned
/// let err = CompObsError::MissingIdentity { index: 2 };
/// log_op_error!(OP_OBSERVE_CYCLE, err, duration_ms = 1u64, cycle = 4u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::ExError;
        let ex_err: ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            $($field)*
        );
    }};
}
