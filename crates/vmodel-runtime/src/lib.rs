#![forbid(unsafe_code)]

//! Validity binding engine for vmodel.
//!
//! Attaches an incrementally recomputed tree of validity flags (model,
//! attribute, attribute × test) to an observable subject record, publishing
//! the flags as `$valid…`/`$invalid…` keys and announcing every flip as a
//! typed [`ValidityEvent`](vmodel_core::ValidityEvent).
//!
//! - [`bind`], [`bind_with_sink`], [`bind_with_config`]: create a
//!   [`ValidityBinding`].
//! - [`config`]: global defaults and per-binding [`ValidityConfig`] snapshots.
//! - [`BindingGuard`], [`BindingSet`]: scope-bound binding lifetimes.
//! - [`ValidityTree`]: structured read-back of published flags.
//!
//! # Architecture
//!
//! Records are shared through `Rc` and mutated through `&self`; everything
//! runs on one thread and every pass is synchronous. A binding subscribes to
//! its subject's change notifications and recomputes the full tree on each
//! one, writing only the nodes whose flag changed.

pub mod binding;
pub mod config;
pub mod error;
pub mod scope;
pub mod tree;

pub use binding::{PassSummary, ValidityBinding, bind, bind_with_config, bind_with_sink};
pub use config::{
    ConfigurationOptions, ValidityConfig, configure, current_configuration, reset_configuration,
};
pub use error::{Result, ValidityError};
pub use scope::{BindingGuard, BindingHandle, BindingSet};
pub use tree::{AttributeValidity, TestValidity, ValidityTree, inconsistent_paths};
