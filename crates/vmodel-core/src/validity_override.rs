#![forbid(unsafe_code)]

//! Per-test validity override.
//!
//! After a test's own result is known, an override may replace it. The
//! override sees everything about the test being published and returns the
//! validity that should be folded and written instead.

use std::fmt;

use crate::record::ObservableRecord;
use crate::value::Value;

/// Everything known about one test at the moment it is published.
pub struct OverrideContext<'a> {
    pub attribute_name: &'a str,
    pub attribute_value: &'a Value,
    /// The subject record.
    pub model: &'a dyn ObservableRecord,
    pub test_name: &'a str,
    /// The test's own result.
    pub validity: bool,
    /// The record receiving validity keys. May be the subject itself.
    pub validity_model: &'a dyn ObservableRecord,
}

impl fmt::Debug for OverrideContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideContext")
            .field("attribute_name", &self.attribute_name)
            .field("attribute_value", &self.attribute_value)
            .field("test_name", &self.test_name)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}

/// Replaces a test's validity before it is folded and published.
pub trait ValidityOverride {
    fn override_validity(&self, context: &OverrideContext<'_>) -> bool;
}

impl<F> ValidityOverride for F
where
    F: Fn(&OverrideContext<'_>) -> bool,
{
    fn override_validity(&self, context: &OverrideContext<'_>) -> bool {
        self(context)
    }
}

/// Returns the test's own result unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IdentityOverride;

impl ValidityOverride for IdentityOverride {
    fn override_validity(&self, context: &OverrideContext<'_>) -> bool {
        context.validity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MemoryRecord;
    use serde_json::json;

    fn with_context<R>(validity: bool, f: impl FnOnce(&OverrideContext<'_>) -> R) -> R {
        let model = MemoryRecord::new();
        let value = json!("x");
        let context = OverrideContext {
            attribute_name: "name",
            attribute_value: &value,
            model: &model,
            test_name: "required",
            validity,
            validity_model: &model,
        };
        f(&context)
    }

    #[test]
    fn identity_passes_through() {
        assert!(with_context(true, |c| IdentityOverride.override_validity(c)));
        assert!(!with_context(false, |c| IdentityOverride.override_validity(c)));
    }

    #[test]
    fn closures_are_overrides() {
        let always_valid = |_: &OverrideContext<'_>| true;
        assert!(with_context(false, |c| always_valid.override_validity(c)));

        let only_required = |c: &OverrideContext<'_>| c.test_name != "required" || c.validity;
        assert!(!with_context(false, |c| only_required.override_validity(c)));
    }

    #[test]
    fn debug_omits_records() {
        let rendered = with_context(true, |c| format!("{c:?}"));
        assert!(rendered.contains("attribute_name: \"name\""));
        assert!(!rendered.contains("MemoryRecord"));
    }
}
