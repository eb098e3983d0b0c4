//! Item identity and equality policy.
//!
//! A snapshot item is recognised across runs by its [`ItemKey`] and compared
//! for content changes by an equality function. Both come from an
//! [`ItemPolicy`], which is built from the item type's defaults ([`Item`])
//! and the caller's [`ObserveOptions`] overrides.

pub mod key;
pub mod policy;

pub use key::{Item, ItemKey};
pub use policy::{EqualsFn, IdentityFn, ItemPolicy, ObserveOptions};
