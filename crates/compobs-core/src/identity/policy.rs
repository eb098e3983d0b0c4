//! Identity/equality policy and the observer options that override it.

use std::rc::Rc;

use serde_json::Value;

use crate::errors::CompObsError;
use crate::identity::key::{Item, ItemKey};

/// Derives the identity key of an item; `None` means "no identity".
pub type IdentityFn<T> = Rc<dyn Fn(&T) -> Option<ItemKey>>;

/// Returns `true` when two versions of the same item have equal content.
pub type EqualsFn<T> = Rc<dyn Fn(&T, &T) -> bool>;

/// Caller overrides for the identity and equality rules.
///
/// Absent fields fall back to the item type's defaults: [`Item::default_identity`]
/// and `PartialEq`.
pub struct ObserveOptions<T> {
    identity_of: Option<IdentityFn<T>>,
    equals: Option<EqualsFn<T>>,
}

impl<T> ObserveOptions<T> {
    pub fn new() -> Self {
        Self {
            identity_of: None,
            equals: None,
        }
    }

    /// Use a custom identity extraction.
    pub fn with_identity(mut self, identity_of: impl Fn(&T) -> Option<ItemKey> + 'static) -> Self {
        self.identity_of = Some(Rc::new(identity_of));
        self
    }

    /// Use a custom content comparison (e.g. a version-number compare).
    ///
    /// The function must be reflexive and side-effect free; it may be called
    /// more than once per cycle.
    pub fn with_equals(mut self, equals: impl Fn(&T, &T) -> bool + 'static) -> Self {
        self.equals = Some(Rc::new(equals));
        self
    }
}

impl ObserveOptions<Value> {
    /// Key JSON items by a single named field instead of `id`/`_id`.
    pub fn with_identity_field(self, field: impl Into<String>) -> Self {
        let field = field.into();
        self.with_identity(move |item: &Value| item.get(&field).and_then(ItemKey::from_json))
    }
}

impl<T> Default for ObserveOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolved identity and equality rules for one observer or diff call.
pub struct ItemPolicy<T> {
    identity_of: IdentityFn<T>,
    equals: EqualsFn<T>,
}

impl<T> Clone for ItemPolicy<T> {
    fn clone(&self) -> Self {
        Self {
            identity_of: Rc::clone(&self.identity_of),
            equals: Rc::clone(&self.equals),
        }
    }
}

impl<T: Item + 'static> ItemPolicy<T> {
    /// Policy using the item type's defaults.
    pub fn new() -> Self {
        Self::from_options(ObserveOptions::new())
    }

    /// Resolve caller options against the item type's defaults.
    pub fn from_options(options: ObserveOptions<T>) -> Self {
        let identity_of: IdentityFn<T> = match options.identity_of {
            Some(identity_of) => identity_of,
            None => Rc::new(|item: &T| item.default_identity()),
        };
        let equals: EqualsFn<T> = match options.equals {
            Some(equals) => equals,
            None => Rc::new(|old: &T, new: &T| old == new),
        };
        Self {
            identity_of,
            equals,
        }
    }
}

impl<T: Item + 'static> Default for ItemPolicy<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ItemPolicy<T> {
    /// Identity of `item`, if one can be derived.
    pub fn identity_of(&self, item: &T) -> Option<ItemKey> {
        (self.identity_of)(item)
    }

    /// Identity of the item at `index` of a snapshot.
    ///
    /// # Errors
    ///
    /// `MissingIdentity` if the policy yields no key.
    pub fn key_at(&self, item: &T, index: usize) -> std::result::Result<ItemKey, CompObsError> {
        self.identity_of(item)
            .ok_or(CompObsError::MissingIdentity { index })
    }

    /// Whether `old` and `new` have equal content.
    pub fn equals(&self, old: &T, new: &T) -> bool {
        (self.equals)(old, new)
    }
}
