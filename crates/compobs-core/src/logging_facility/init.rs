//! Subscriber installation for binaries and demos that drive observers.
//!
//! The library itself only emits events; nothing is printed until a host
//! installs a subscriber, either its own or the one built here.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Output profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines, including per-cycle debug events such as
    /// queued reruns and stops mid-dispatch
    Development,
    /// JSON lines at info: observer start, stop and cycle boundaries
    Production,
    /// No output; tests install a capture layer via `init_test_capture`
    Test,
}

impl Profile {
    /// Filter directive used when `RUST_LOG` is unset.
    pub fn default_directive(self) -> &'static str {
        match self {
            Profile::Development => "compobs_core=debug",
            Profile::Production => "compobs_core=info",
            Profile::Test => "off",
        }
    }

    fn env_filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

static INIT_ONCE: Once = Once::new();

/// Install the global subscriber for `profile`. Only the first call in a
/// process has any effect; `RUST_LOG` overrides the profile's directive.
///
/// # Example
///
/// ```
/// use compobs_core::logging_facility::{init, Profile};
/// use compobs_core::{observe, ManualRuntime, ObserveCallbacks, ObserveOptions};
/// use serde_json::{json, Value};
///
/// init(Profile::Development);
///
/// // observe_start and observe_cycle events now reach stdout
/// let observer = observe(
///     ManualRuntime::new(),
///     || vec![json!({ "id": 1 })],
///     ObserveCallbacks::<Value>::new(),
///     ObserveOptions::new(),
/// )
/// .unwrap();
/// observer.stop();
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_env_filter(profile.env_filter())
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(profile.env_filter())
                .init();
        }
        Profile::Test => {
            tracing_subscriber::registry().init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_idempotent() {
        init(Profile::Test);
        init(Profile::Test);
    }

    #[test]
    fn test_directives_target_this_crate() {
        assert_eq!(Profile::Development.default_directive(), "compobs_core=debug");
        assert_eq!(Profile::Production.default_directive(), "compobs_core=info");
        assert_eq!(Profile::Test.default_directive(), "off");
    }
}
