//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Observer identifiers
pub const FIELD_OBSERVER_ID: &str = "observer_id";
pub const FIELD_CYCLE: &str = "cycle";
pub const FIELD_ITEM_KEY: &str = "item_key";

// Collection sizes
pub const FIELD_SNAPSHOT_LEN: &str = "snapshot_len";
pub const FIELD_CHANGE_COUNT: &str = "change_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Canonical operation names
pub const OP_OBSERVE_START: &str = "observe_start";
pub const OP_OBSERVE_CYCLE: &str = "observe_cycle";
pub const OP_OBSERVE_STOP: &str = "observe_stop";
pub const OP_DISPATCH: &str = "dispatch";
