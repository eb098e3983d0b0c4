#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use compobs_core::{ItemKey, ObserveCallbacks};
use serde_json::{json, Value};

/// Build an item `{ "id": id, "v": v }`
pub fn item(id: i64, v: &str) -> Value {
    json!({ "id": id, "v": v })
}

/// Build a sequence of items from `(id, v)` pairs
pub fn items(pairs: &[(i64, &str)]) -> Vec<Value> {
    pairs.iter().map(|(id, v)| item(*id, v)).collect()
}

/// Shared mutable source that a computation closure reads from
#[derive(Clone, Default)]
pub struct Source(Rc<RefCell<Vec<Value>>>);

impl Source {
    pub fn new(initial: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(initial)))
    }

    pub fn set(&self, next: Vec<Value>) {
        *self.0.borrow_mut() = next;
    }

    pub fn read(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    /// A computation closure over this source
    pub fn computation(&self) -> impl FnMut() -> Vec<Value> + 'static {
        let source = self.clone();
        move || source.read()
    }
}

/// Records every callback invocation and keeps a consumer-side copy of the
/// sequence, updated by index exactly as the callbacks describe.
#[derive(Clone, Default)]
pub struct Recorder {
    log: Rc<RefCell<Vec<String>>>,
    mirror: Rc<RefCell<Vec<Value>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    /// Append an entry from a hand-built callback
    pub fn note(&self, entry: impl Into<String>) {
        self.log.borrow_mut().push(entry.into());
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn mirror(&self) -> Vec<Value> {
        self.mirror.borrow().clone()
    }

    pub fn callbacks(&self) -> ObserveCallbacks<Value> {
        let (added_log, added_mirror) = (self.log.clone(), self.mirror.clone());
        let (removed_log, removed_mirror) = (self.log.clone(), self.mirror.clone());
        let (changed_log, changed_mirror) = (self.log.clone(), self.mirror.clone());
        let (moved_log, moved_mirror) = (self.log.clone(), self.mirror.clone());

        ObserveCallbacks::<Value>::new()
            .on_added(move |item, index| {
                added_log
                    .borrow_mut()
                    .push(format!("added {} at {}", item["id"], index));
                added_mirror.borrow_mut().insert(index, item.clone());
                Ok(())
            })
            .on_removed(move |key, index| {
                removed_log
                    .borrow_mut()
                    .push(format!("removed {} at {}", key, index));
                removed_mirror.borrow_mut().remove(index);
                Ok(())
            })
            .on_changed(move |key, old, new| {
                changed_log
                    .borrow_mut()
                    .push(format!("changed {} {} -> {}", key, old["v"], new["v"]));
                let mut mirror = changed_mirror.borrow_mut();
                if let Some(slot) = mirror
                    .iter_mut()
                    .find(|v| ItemKey::from_json(&v["id"]).as_ref() == Some(key))
                {
                    *slot = new.clone();
                }
                Ok(())
            })
            .on_moved(move |key, from, to| {
                moved_log
                    .borrow_mut()
                    .push(format!("moved {} {} -> {}", key, from, to));
                let mut mirror = moved_mirror.borrow_mut();
                let entry = mirror.remove(from);
                mirror.insert(to, entry);
                Ok(())
            })
    }
}
