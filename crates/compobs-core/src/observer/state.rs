//! Observer lifecycle states.

use serde::{Deserialize, Serialize};

/// Externally visible lifecycle state.
///
/// `Created → Started → Stopped`. A running diff cycle is not a state of
/// its own; it happens while `Started`. `Stopped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverState {
    Created,
    Started,
    Stopped,
}

impl ObserverState {
    pub fn is_active(&self) -> bool {
        matches!(self, ObserverState::Started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_started_is_active() {
        assert!(!ObserverState::Created.is_active());
        assert!(ObserverState::Started.is_active());
        assert!(!ObserverState::Stopped.is_active());
    }
}
