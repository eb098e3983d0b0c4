//! Identity keys and the default identity hook for item types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields consulted, in order, when deriving a key from a JSON item.
pub const DEFAULT_IDENTITY_FIELDS: &[&str] = &["id", "_id"];

/// Stable identity of a snapshot item.
///
/// Integer and string keys are kept apart, so `1` and `"1"` never collide.
/// Any other JSON identity (floats, objects, booleans) is keyed by its
/// canonical JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKey {
    Str(String),
    Int(i64),
    Other(String),
}

impl ItemKey {
    /// Derive a key from a JSON identity value. `null` has no identity.
    pub fn from_json(value: &Value) -> Option<ItemKey> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(ItemKey::Str(s.clone())),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => ItemKey::Int(i),
                None => ItemKey::Other(n.to_string()),
            }),
            other => Some(ItemKey::Other(other.to_string())),
        }
    }
}

impl From<&str> for ItemKey {
    fn from(s: &str) -> Self {
        ItemKey::Str(s.to_string())
    }
}

impl From<String> for ItemKey {
    fn from(s: String) -> Self {
        ItemKey::Str(s)
    }
}

impl From<i64> for ItemKey {
    fn from(i: i64) -> Self {
        ItemKey::Int(i)
    }
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKey::Str(s) => write!(f, "{}", s),
            ItemKey::Int(i) => write!(f, "{}", i),
            ItemKey::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A value that can appear in a snapshot.
///
/// `default_identity` is used when the observer options do not supply an
/// identity function. Types without a natural identity keep the default
/// `None` and must be observed with an explicit identity option.
pub trait Item: Clone + PartialEq {
    fn default_identity(&self) -> Option<ItemKey> {
        None
    }
}

impl Item for Value {
    /// Reads `id`, then `_id`.
    fn default_identity(&self) -> Option<ItemKey> {
        let obj = self.as_object()?;
        DEFAULT_IDENTITY_FIELDS
            .iter()
            .find_map(|field| obj.get(*field).and_then(ItemKey::from_json))
    }
}
