//! Structured logging for the observer
//!
//! - Single initialization point via `init(profile)`
//! - Structured logging macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//!   that stamp every event with `component`, `op` and `event`
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use compobs_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```
//!
//! The filter honours `RUST_LOG`; without it the Development profile logs
//! `compobs_core=debug` and Production logs `compobs_core=info`.

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
