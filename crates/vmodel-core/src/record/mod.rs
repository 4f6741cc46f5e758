#![forbid(unsafe_code)]

//! The observable record contract.
//!
//! A record is a shared key/value store that announces its own changes.
//! Records are used through shared references (`Rc<R>`), so every operation
//! takes `&self` and implementations rely on interior mutability.
//!
//! # Contract
//!
//! 1. `get` and `set` are synchronous.
//! 2. After one or more `set` calls complete, the record delivers a
//!    [`RecordEvent::Change`] to its listeners.
//! 3. A change notification is never dispatched re-entrantly: changes made
//!    by a listener while a notification is being delivered are announced
//!    after that delivery returns.
//! 4. `trigger` delivers the given event to every listener synchronously.
//! 5. `off` with an unknown or already removed id is a no-op.

mod memory;

pub use memory::MemoryRecord;

use std::rc::Rc;

use crate::event::RecordEvent;
use crate::value::Value;

/// Listener callback registered through [`ObservableRecord::on`].
pub type Handler = Rc<dyn Fn(&RecordEvent)>;

/// Handle identifying one registered listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A shared, observable key/value record.
pub trait ObservableRecord {
    /// Current value stored at `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` at `key`, announcing the change when the value differs.
    fn set(&self, key: &str, value: Value);

    /// Register a listener for every event this record delivers.
    fn on(&self, handler: Handler) -> ListenerId;

    /// Remove a listener. Returns whether it was registered.
    fn off(&self, id: ListenerId) -> bool;

    /// Deliver `event` to every listener.
    fn trigger(&self, event: &RecordEvent);

    /// Boolean stored at `key`; `None` when absent or not a boolean.
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.as_bool())
    }
}
