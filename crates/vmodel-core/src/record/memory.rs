#![forbid(unsafe_code)]

//! In-memory [`ObservableRecord`].
//!
//! # Invariants
//!
//! 1. Keys keep insertion order.
//! 2. Setting a value equal to the stored value is a no-op (no notification).
//! 3. Listeners are notified in registration order.
//! 4. A listener removed during a dispatch is not invoked afterwards in that
//!    dispatch.
//! 5. Changes made while a change notification is being delivered are queued
//!    and announced in one follow-up [`RecordEvent::Change`] once the current
//!    delivery returns.
//!
//! # Failure Modes
//!
//! - Listener panic: propagates to the caller of `set`/`trigger`. The
//!   dispatch flag is released and queued changes are dropped, so the record
//!   stays usable.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{Handler, ListenerId, ObservableRecord};
use crate::declaration::{TestDeclaration, ValidatedRecord};
use crate::event::RecordEvent;
use crate::validity_override::ValidityOverride;
use crate::value::Value;

/// Single-threaded observable key/value record.
///
/// Besides plain values, a `MemoryRecord` can carry named test declarations
/// and a validity override, which makes it usable as a validation subject.
#[derive(Default)]
pub struct MemoryRecord {
    values: RefCell<IndexMap<String, Value>>,
    listeners: RefCell<Vec<(ListenerId, Handler)>>,
    next_listener: Cell<u64>,
    pending: RefCell<Vec<String>>,
    dispatching: Cell<bool>,
    declarations: RefCell<IndexMap<String, Rc<TestDeclaration>>>,
    validity_override: RefCell<Option<Rc<dyn ValidityOverride>>>,
}

impl MemoryRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a record pre-populated with `values` (no notifications).
    #[must_use]
    pub fn with_values<K: Into<String>>(values: impl IntoIterator<Item = (K, Value)>) -> Self {
        let record = Self::new();
        record
            .values
            .borrow_mut()
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        record
    }

    /// Attach a test declaration under `property`.
    #[must_use]
    pub fn with_declaration(self, property: impl Into<String>, declaration: TestDeclaration) -> Self {
        self.set_declaration(property, declaration);
        self
    }

    /// Attach a validity override capability.
    #[must_use]
    pub fn with_validity_override(self, hook: impl ValidityOverride + 'static) -> Self {
        self.set_validity_override(Some(Rc::new(hook)));
        self
    }

    /// Replace the test declaration stored under `property`.
    pub fn set_declaration(&self, property: impl Into<String>, declaration: TestDeclaration) {
        self.declarations
            .borrow_mut()
            .insert(property.into(), Rc::new(declaration));
    }

    /// Replace (or clear) the validity override capability.
    pub fn set_validity_override(&self, hook: Option<Rc<dyn ValidityOverride>>) {
        *self.validity_override.borrow_mut() = hook;
    }

    /// Write several keys and announce them in a single change notification.
    pub fn set_many<K: Into<String>>(&self, entries: impl IntoIterator<Item = (K, Value)>) {
        let mut changed = Vec::new();
        {
            let mut values = self.values.borrow_mut();
            for (key, value) in entries {
                let key = key.into();
                if values.get(&key) == Some(&value) {
                    continue;
                }
                values.insert(key.clone(), value);
                changed.push(key);
            }
        }
        if changed.is_empty() {
            return;
        }
        self.pending.borrow_mut().extend(changed);
        self.flush_changes();
    }

    /// Stored keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn flush_changes(&self) {
        if self.dispatching.get() {
            return;
        }
        let _guard = DispatchGuard::enter(self);
        loop {
            let keys = std::mem::take(&mut *self.pending.borrow_mut());
            if keys.is_empty() {
                break;
            }
            tracing::trace!(keys = ?keys, "record change");
            self.dispatch(&RecordEvent::Change { keys });
        }
    }

    fn dispatch(&self, event: &RecordEvent) {
        // Snapshot so listeners may register or remove listeners while running.
        let snapshot: Vec<(ListenerId, Handler)> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, handler)| (*id, Rc::clone(handler)))
            .collect();
        for (id, handler) in snapshot {
            if self.is_listening(id) {
                handler(event);
            }
        }
    }

    fn is_listening(&self, id: ListenerId) -> bool {
        self.listeners.borrow().iter().any(|(l, _)| *l == id)
    }
}

impl ObservableRecord for MemoryRecord {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.set_many([(key, value)]);
    }

    fn on(&self, handler: Handler) -> ListenerId {
        let id = ListenerId::from_raw(self.next_listener.get());
        self.next_listener.set(id.raw() + 1);
        self.listeners.borrow_mut().push((id, handler));
        id
    }

    fn off(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(l, _)| *l != id);
        listeners.len() != before
    }

    fn trigger(&self, event: &RecordEvent) {
        self.dispatch(event);
    }
}

impl ValidatedRecord for MemoryRecord {
    fn test_declaration(&self, property: &str) -> Option<Rc<TestDeclaration>> {
        self.declarations.borrow().get(property).cloned()
    }

    fn validity_override(&self) -> Option<Rc<dyn ValidityOverride>> {
        self.validity_override.borrow().clone()
    }
}

impl fmt::Debug for MemoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryRecord")
            .field("values", &*self.values.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .field(
                "declarations",
                &self.declarations.borrow().keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Marks the record as dispatching; released on drop, including unwind.
struct DispatchGuard<'a> {
    record: &'a MemoryRecord,
}

impl<'a> DispatchGuard<'a> {
    fn enter(record: &'a MemoryRecord) -> Self {
        record.dispatching.set(true);
        Self { record }
    }
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.record.dispatching.set(false);
        self.record.pending.borrow_mut().clear();
    }
}
