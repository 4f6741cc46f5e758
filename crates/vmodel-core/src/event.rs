#![forbid(unsafe_code)]

//! Typed notifications delivered through [`ObservableRecord::trigger`].
//!
//! Two families exist:
//!
//! - [`RecordEvent::Change`]: one or more keys of a record changed value.
//! - [`RecordEvent::Validity`]: a node of the validity tree flipped.
//!
//! Validity events carry a structured path. The legacy string form
//! (`valid`, `invalid:name`, `valid:name/required`) is available through
//! [`ValidityEvent::name`] for callers that key listeners by name.
//!
//! [`ObservableRecord::trigger`]: crate::ObservableRecord::trigger

use std::fmt;

use crate::path::{DEFAULT_SEPARATOR, ValidityPath};

/// A validity flip for one node of the tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValidityEvent {
    RootValid,
    RootInvalid,
    AttributeValid { attribute: String },
    AttributeInvalid { attribute: String },
    TestValid { attribute: String, test: String },
    TestInvalid { attribute: String, test: String },
}

impl ValidityEvent {
    /// Build the event announcing that `path` now has `validity`.
    #[must_use]
    pub fn new(path: ValidityPath, validity: bool) -> Self {
        match (path, validity) {
            (ValidityPath::Root, true) => Self::RootValid,
            (ValidityPath::Root, false) => Self::RootInvalid,
            (ValidityPath::Attribute(attribute), true) => Self::AttributeValid { attribute },
            (ValidityPath::Attribute(attribute), false) => Self::AttributeInvalid { attribute },
            (ValidityPath::Test { attribute, test }, true) => Self::TestValid { attribute, test },
            (ValidityPath::Test { attribute, test }, false) => Self::TestInvalid { attribute, test },
        }
    }

    /// The node this event is about.
    #[must_use]
    pub fn path(&self) -> ValidityPath {
        match self {
            Self::RootValid | Self::RootInvalid => ValidityPath::Root,
            Self::AttributeValid { attribute } | Self::AttributeInvalid { attribute } => {
                ValidityPath::Attribute(attribute.clone())
            }
            Self::TestValid { attribute, test } | Self::TestInvalid { attribute, test } => {
                ValidityPath::test(attribute.clone(), test.clone())
            }
        }
    }

    /// Whether the node became valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            Self::RootValid | Self::AttributeValid { .. } | Self::TestValid { .. }
        )
    }

    /// Legacy event name: `valid`/`invalid`, suffixed with `:<path>` for
    /// non-root nodes, path segments joined by `separator`.
    #[must_use]
    pub fn name(&self, separator: &str) -> String {
        let base = if self.is_valid() { "valid" } else { "invalid" };
        let path = self.path();
        if path.is_root() {
            base.to_string()
        } else {
            format!("{base}:{}", path.join(separator))
        }
    }
}

impl fmt::Display for ValidityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name(DEFAULT_SEPARATOR))
    }
}

/// Any notification a record can deliver to its listeners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordEvent {
    /// Keys whose stored value changed, in write order.
    Change { keys: Vec<String> },
    /// A validity node flipped.
    Validity(ValidityEvent),
}

impl RecordEvent {
    #[must_use]
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Change { .. })
    }

    #[must_use]
    pub fn as_validity(&self) -> Option<&ValidityEvent> {
        match self {
            Self::Validity(event) => Some(event),
            Self::Change { .. } => None,
        }
    }
}

impl From<ValidityEvent> for RecordEvent {
    fn from(event: ValidityEvent) -> Self {
        Self::Validity(event)
    }
}
