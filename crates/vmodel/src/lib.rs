#![forbid(unsafe_code)]

//! vmodel public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users.
//!
//! ```
//! use std::rc::Rc;
//! use vmodel::prelude::*;
//!
//! let declaration = TestDeclaration::builder()
//!     .attribute("age", |t| t.test("required", |v, _| is_truthy(v)))
//!     .build();
//! let person = Rc::new(
//!     MemoryRecord::with_values([("age", Value::from(0))]).with_declaration("validation", declaration),
//! );
//! let mut form = BindingSet::new();
//! form.hold(bind(&person).unwrap());
//! assert_eq!(person.get_bool("$invalid/age"), Some(true));
//!
//! person.set("age", Value::from(30));
//! assert_eq!(person.get_bool("$valid"), Some(true));
//! ```

pub use vmodel_core as core;
pub use vmodel_runtime as runtime;

pub use vmodel_runtime::{
    ValidityBinding, ValidityError, bind, bind_with_config, bind_with_sink, configure,
    reset_configuration,
};

pub mod prelude {
    pub use vmodel_core::{
        MemoryRecord, ObservableRecord, OverrideContext, RecordEvent, TestDeclaration,
        ValidatedRecord, ValidityEvent, ValidityOverride, ValidityPath, Value, is_truthy,
        to_number,
    };
    pub use vmodel_runtime::{
        BindingGuard, BindingSet, ConfigurationOptions, PassSummary, ValidityBinding,
        ValidityConfig, ValidityTree, bind, bind_with_config, bind_with_sink, configure,
        reset_configuration,
    };
}
