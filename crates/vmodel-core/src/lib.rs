#![forbid(unsafe_code)]

//! Core data model for vmodel.
//!
//! This crate holds everything the validity engine needs to talk to a record
//! without knowing how the record is implemented:
//!
//! - [`ObservableRecord`]: the get/set/on/off/trigger contract.
//! - [`MemoryRecord`]: an in-memory, single-threaded implementation.
//! - [`ValidityPath`]: the three-level node address (`root`, `attribute`,
//!   `attribute/test`) and its projection into flat record keys.
//! - [`ValidityEvent`] and [`RecordEvent`]: typed notifications.
//! - [`TestDeclaration`]: the attribute → test → predicate mapping.
//! - [`ValidityOverride`]: the optional per-test override capability.

pub mod declaration;
pub mod event;
pub mod path;
pub mod record;
pub mod validity_override;
pub mod value;

pub use declaration::{
    AttributeTests, Predicate, TestDeclaration, TestDeclarationBuilder, ValidatedRecord,
};
pub use event::{RecordEvent, ValidityEvent};
pub use path::{DEFAULT_SEPARATOR, INVALID_PREFIX, VALID_PREFIX, ValidityPath};
pub use record::{Handler, ListenerId, MemoryRecord, ObservableRecord};
pub use validity_override::{IdentityOverride, OverrideContext, ValidityOverride};
pub use value::{Value, is_truthy, to_number};
