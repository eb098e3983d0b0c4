//! Snapshot differ.
//!
//! Compares two ordered snapshots of identified items and produces the
//! ordered change operations that turn the first into the second.
//!
//! ## Entry point
//!
//! ```
//! use compobs_core::diff::diff;
//! use compobs_core::identity::ItemPolicy;
//! use serde_json::json;
//!
//! let policy = ItemPolicy::new();
//! let previous = vec![json!({"id": 1, "v": "x"})];
//! let current = vec![json!({"id": 1, "v": "x2"})];
//! let changes = diff(&previous, &current, &policy).unwrap();
//! assert_eq!(changes.len(), 1);
//! ```
//!
//! ## Guarantees
//!
//! - **Delivery order**: removed, then changed, then moved, then added.
//! - **Apply-time indices**: every index is valid for a mirror that has
//!   applied all earlier operations of the same change set, so a plain
//!   `Vec` can be updated in order without index drift.
//! - **Minimal moves**: only items outside the retained stable subsequence
//!   are reported as moved.
//! - **Determinism**: identical inputs always produce identical output.

pub mod engine;
pub mod human_summary;
pub mod mirror;
pub mod model;
pub mod snapshot;

pub use engine::{diff, diff_snapshots};
pub use human_summary::render_summary;
pub use mirror::Mirror;
pub use model::{Change, ChangeCounts, ChangeKind, ChangeSet};
pub use snapshot::Snapshot;
