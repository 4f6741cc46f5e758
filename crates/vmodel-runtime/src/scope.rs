#![forbid(unsafe_code)]

//! Lifecycle helpers for validity bindings.
//!
//! A bare [`ValidityBinding`] stays subscribed until [`unbind`] is called,
//! even when every handle to it is dropped. These helpers tie that lifetime
//! to a scope instead:
//!
//! - [`BindingGuard`]: one binding, unbound on drop.
//! - [`BindingSet`]: any number of bindings (of any record types), all
//!   unbound on drop or on [`BindingSet::unbind_all`].
//!
//! ```
//! use std::rc::Rc;
//! use vmodel_core::{MemoryRecord, TestDeclaration};
//! use vmodel_runtime::BindingSet;
//!
//! let subject = Rc::new(MemoryRecord::new().with_declaration("validation", TestDeclaration::new()));
//! let mut set = BindingSet::new();
//! set.hold(vmodel_runtime::bind(&subject).unwrap());
//! assert_eq!(subject.listener_count(), 1);
//!
//! drop(set);
//! assert_eq!(subject.listener_count(), 0);
//! ```
//!
//! [`unbind`]: ValidityBinding::unbind

use std::fmt;
use std::ops::Deref;

use vmodel_core::{ObservableRecord, ValidatedRecord};

use crate::binding::ValidityBinding;

/// Object-safe view of a binding's lifecycle.
pub trait BindingHandle {
    fn unbind(&self);
    fn is_bound(&self) -> bool;
}

impl<S, V> BindingHandle for ValidityBinding<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    fn unbind(&self) {
        ValidityBinding::unbind(self);
    }

    fn is_bound(&self) -> bool {
        ValidityBinding::is_bound(self)
    }
}

// ---------------------------------------------------------------------------
// BindingGuard
// ---------------------------------------------------------------------------

/// RAII guard that unbinds its binding on drop.
#[must_use = "dropping the guard unbinds immediately"]
pub struct BindingGuard<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    binding: Option<ValidityBinding<S, V>>,
}

impl<S, V> BindingGuard<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    pub fn new(binding: ValidityBinding<S, V>) -> Self {
        Self {
            binding: Some(binding),
        }
    }

    /// Disarm the guard, returning the still-bound binding.
    #[must_use]
    pub fn release(mut self) -> ValidityBinding<S, V> {
        self.binding
            .take()
            .expect("binding is only taken by release or drop")
    }
}

impl<S, V> Deref for BindingGuard<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    type Target = ValidityBinding<S, V>;

    fn deref(&self) -> &Self::Target {
        self.binding
            .as_ref()
            .expect("binding is only taken by release or drop")
    }
}

impl<S, V> Drop for BindingGuard<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    fn drop(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.unbind();
        }
    }
}

impl<S, V> fmt::Debug for BindingGuard<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingGuard")
            .field("binding", &self.binding)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// BindingSet
// ---------------------------------------------------------------------------

/// Collects bindings for a logical scope (e.g., a form).
///
/// # Invariants
///
/// 1. Bindings are unbound in reverse registration order on drop.
/// 2. `unbind_all()` leaves the set empty and reusable.
/// 3. `len()` counts held bindings, bound or not.
#[derive(Default)]
pub struct BindingSet {
    bindings: Vec<Box<dyn BindingHandle>>,
}

impl BindingSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `binding` until the set is dropped or cleared.
    pub fn hold(&mut self, binding: impl BindingHandle + 'static) -> &mut Self {
        self.bindings.push(Box::new(binding));
        self
    }

    /// Unbind every held binding, newest first, and forget them.
    pub fn unbind_all(&mut self) {
        while let Some(binding) = self.bindings.pop() {
            binding.unbind();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of held bindings that are still subscribed.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bindings.iter().filter(|b| b.is_bound()).count()
    }
}

impl Drop for BindingSet {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

impl fmt::Debug for BindingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingSet")
            .field("len", &self.bindings.len())
            .field("bound", &self.bound_count())
            .finish()
    }
}
