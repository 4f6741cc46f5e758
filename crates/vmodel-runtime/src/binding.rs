#![forbid(unsafe_code)]

//! Validity bindings: keep a tree of validity flags in sync with a subject.
//!
//! A [`ValidityBinding`] connects a subject record (which owns the data and
//! the test declaration) to a validity sink (which receives the flags). The
//! sink may be the subject itself.
//!
//! # Usage
//!
//! ```
//! use std::rc::Rc;
//! use serde_json::json;
//! use vmodel_core::{MemoryRecord, ObservableRecord, TestDeclaration};
//!
//! let declaration = TestDeclaration::builder()
//!     .attribute("name", |t| t.test("required", |v, _| v.as_str() != Some("")))
//!     .build();
//! let subject = Rc::new(
//!     MemoryRecord::with_values([("name", json!(""))]).with_declaration("validation", declaration),
//! );
//!
//! let binding = vmodel_runtime::bind(&subject).unwrap();
//! assert_eq!(subject.get_bool("$valid"), Some(false));
//! assert_eq!(subject.get_bool("$invalid/name/required"), Some(true));
//!
//! subject.set("name", json!("Ada"));
//! assert_eq!(subject.get_bool("$valid"), Some(true));
//!
//! binding.unbind();
//! ```
//!
//! # Pass
//!
//! Each pass recomputes every declared test of every declared attribute, in
//! declaration order, and publishes depth-first: all tests of an attribute,
//! then the attribute, then (after all attributes) the root. Publishing a
//! node compares against the sink first and does nothing when the stored flag
//! already matches; otherwise it writes `$valid…` and `$invalid…` and emits
//! the matching [`ValidityEvent`] on the enabled targets.
//!
//! In lazy mode, once a test of an attribute fails the remaining tests of
//! that attribute are not run. Their own result counts as passing; the
//! attribute is invalid through the earlier failure.
//!
//! # Invariants
//!
//! 1. After a pass, `$invalid<p> == !$valid<p>` for every published path.
//! 2. A pass with no intervening change writes nothing and emits nothing.
//! 3. The root is valid iff every published test is valid.
//! 4. A node's event is emitted after all of its children's events.
//! 5. When subject and sink are the same record an event is emitted on it at
//!    most once.
//! 6. A pass requested while a pass of the same binding runs is deferred:
//!    the running pass sweeps again once it finishes, until a sweep ends
//!    with no new request.
//! 7. Each binding runs on its own configuration snapshot.
//!
//! # Failure Modes
//!
//! - Predicate panic: propagates to whoever triggered the pass (`bind`,
//!   `validate`, or the subject's `set`). Nodes published before the panic
//!   keep their new flags. The re-entrancy guard is released on unwind.
//! - Handle dropped while bound: the subscription keeps the binding alive and
//!   passes keep running until [`ValidityBinding::unbind`] is called. Use
//!   [`ValidityBinding::into_guard`] for scope-bound lifetimes.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use vmodel_core::{
    ListenerId, ObservableRecord, OverrideContext, RecordEvent, ValidatedRecord, ValidityEvent,
    ValidityOverride, ValidityPath,
};

use crate::config::{ValidityConfig, current_configuration};
use crate::error::Result;
use crate::scope::BindingGuard;
use crate::tree::ValidityTree;

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Bind `subject`, storing validity flags on the subject itself.
///
/// Uses a snapshot of the global configuration.
///
/// # Errors
///
/// [`ValidityError::InvalidArgument`](crate::ValidityError::InvalidArgument)
/// when the global configuration is unusable.
pub fn bind<S>(subject: &Rc<S>) -> Result<ValidityBinding<S, S>>
where
    S: ValidatedRecord + 'static,
{
    bind_with_config(subject, subject, current_configuration())
}

/// Bind `subject`, storing validity flags on `sink`.
///
/// # Errors
///
/// See [`bind`].
pub fn bind_with_sink<S, V>(subject: &Rc<S>, sink: &Rc<V>) -> Result<ValidityBinding<S, V>>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    bind_with_config(subject, sink, current_configuration())
}

/// Bind with an explicit configuration.
///
/// Runs one pass immediately, then subscribes to the subject's change
/// notifications.
///
/// # Errors
///
/// [`ValidityError::InvalidArgument`](crate::ValidityError::InvalidArgument)
/// when `config` fails [`ValidityConfig::validate`]. Nothing is written or
/// subscribed in that case.
pub fn bind_with_config<S, V>(
    subject: &Rc<S>,
    sink: &Rc<V>,
    config: ValidityConfig,
) -> Result<ValidityBinding<S, V>>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    config.validate()?;
    let binding = ValidityBinding {
        inner: Rc::new(BindingInner {
            subject: Rc::clone(subject),
            sink: Rc::clone(sink),
            config: RefCell::new(config),
            listener: Cell::new(None),
            in_pass: Cell::new(false),
            rerun: Cell::new(false),
        }),
    };
    let summary = binding.validate();
    binding.subscribe();
    tracing::debug!(
        same_target = binding.shares_target(),
        writes = summary.writes,
        "validity binding established"
    );
    Ok(binding)
}

// ---------------------------------------------------------------------------
// PassSummary
// ---------------------------------------------------------------------------

/// What one pass did, summed over its sweeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Predicates invoked.
    pub predicates_run: usize,
    /// Predicates skipped by lazy mode.
    pub predicates_skipped: usize,
    /// Nodes whose flags were written (each write sets two keys).
    pub writes: usize,
    /// Events emitted, counted per target.
    pub events: usize,
}

impl PassSummary {
    /// Whether the pass changed nothing in the sink.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.writes == 0 && self.events == 0
    }
}

// ---------------------------------------------------------------------------
// ValidityBinding
// ---------------------------------------------------------------------------

struct BindingInner<S, V> {
    subject: Rc<S>,
    sink: Rc<V>,
    config: RefCell<ValidityConfig>,
    listener: Cell<Option<ListenerId>>,
    in_pass: Cell<bool>,
    rerun: Cell<bool>,
}

/// Live connection between a subject and its validity sink.
///
/// Cloning creates another handle to the same binding.
pub struct ValidityBinding<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    inner: Rc<BindingInner<S, V>>,
}

impl<S, V> Clone for ValidityBinding<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, V> fmt::Debug for ValidityBinding<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidityBinding")
            .field("bound", &self.is_bound())
            .field("same_target", &self.shares_target())
            .field("config", &*self.inner.config.borrow())
            .finish()
    }
}

impl<S, V> ValidityBinding<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    /// Run one pass now.
    pub fn validate(&self) -> PassSummary {
        self.inner.run_pass()
    }

    /// Stop reacting to subject changes. Idempotent.
    ///
    /// Flags already written to the sink are left in place.
    pub fn unbind(&self) {
        if let Some(id) = self.inner.listener.take() {
            self.inner.subject.off(id);
            tracing::debug!("validity binding released");
        }
    }

    /// Whether the binding still reacts to subject changes.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.inner.listener.get().is_some()
    }

    #[must_use]
    pub fn subject(&self) -> &Rc<S> {
        &self.inner.subject
    }

    #[must_use]
    pub fn sink(&self) -> &Rc<V> {
        &self.inner.sink
    }

    /// Whether subject and sink are the same record.
    #[must_use]
    pub fn shares_target(&self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.inner.subject), Rc::as_ptr(&self.inner.sink))
    }

    /// This binding's configuration snapshot.
    #[must_use]
    pub fn configuration(&self) -> ValidityConfig {
        self.inner.config.borrow().clone()
    }

    /// Replace this binding's configuration. Takes effect on the next pass.
    ///
    /// # Errors
    ///
    /// [`ValidityError::InvalidArgument`](crate::ValidityError::InvalidArgument)
    /// when `config` is unusable; the current configuration is kept.
    pub fn reconfigure(&self, config: ValidityConfig) -> Result<()> {
        config.validate()?;
        tracing::debug!(?config, "validity binding reconfigured");
        *self.inner.config.borrow_mut() = config;
        Ok(())
    }

    /// Re-snapshot the global configuration.
    ///
    /// # Errors
    ///
    /// See [`reconfigure`](Self::reconfigure).
    pub fn refresh_configuration(&self) -> Result<()> {
        self.reconfigure(current_configuration())
    }

    /// Read the currently published flags back from the sink.
    #[must_use]
    pub fn snapshot(&self) -> ValidityTree {
        let config = self.inner.config.borrow();
        let declaration = self
            .inner
            .subject
            .test_declaration(&config.validation_property);
        ValidityTree::read(&*self.inner.sink, declaration.as_deref(), &config.separator)
    }

    /// Wrap this binding so it unbinds when the guard drops.
    #[must_use = "dropping the guard unbinds immediately"]
    pub fn into_guard(self) -> BindingGuard<S, V> {
        BindingGuard::new(self)
    }

    fn subscribe(&self) {
        if self.is_bound() {
            return;
        }
        // The handler owns the binding; unbind() breaks the cycle.
        let inner = Rc::clone(&self.inner);
        let id = self.inner.subject.on(Rc::new(move |event: &RecordEvent| {
            if event.is_change() {
                inner.run_pass();
            }
        }));
        self.inner.listener.set(Some(id));
    }
}

// ---------------------------------------------------------------------------
// Pass
// ---------------------------------------------------------------------------

impl<S, V> BindingInner<S, V>
where
    S: ValidatedRecord + 'static,
    V: ObservableRecord + 'static,
{
    fn run_pass(&self) -> PassSummary {
        let Some(_guard) = PassGuard::enter(&self.in_pass) else {
            self.rerun.set(true);
            tracing::trace!("validity pass already running; rerun queued");
            return PassSummary::default();
        };
        let mut summary = PassSummary::default();
        loop {
            self.rerun.set(false);
            self.sweep(&mut summary);
            if !self.rerun.get() {
                return summary;
            }
        }
    }

    fn sweep(&self, summary: &mut PassSummary) {
        let config = self.config.borrow().clone();
        let _span = tracing::debug_span!(
            "validity_pass",
            property = %config.validation_property,
            lazy = config.lazy
        )
        .entered();

        let (run, skipped, writes, events) = (
            summary.predicates_run,
            summary.predicates_skipped,
            summary.writes,
            summary.events,
        );
        let hook = config
            .validity_override
            .clone()
            .or_else(|| self.subject.validity_override());
        let mut model_validity = true;

        if let Some(declaration) = self.subject.test_declaration(&config.validation_property) {
            for (attribute, tests) in declaration.iter() {
                let value = self.subject.get(attribute).unwrap_or(Value::Null);
                let mut attribute_validity = true;

                for (test, predicate) in tests.iter() {
                    let raw = if config.lazy && !attribute_validity {
                        summary.predicates_skipped += 1;
                        true
                    } else {
                        summary.predicates_run += 1;
                        predicate(&value, &*self.subject)
                    };
                    let test_validity =
                        self.apply_override(hook.as_deref(), attribute, &value, test, raw);

                    attribute_validity = attribute_validity && test_validity;
                    model_validity = model_validity && test_validity;
                    self.publish(
                        &config,
                        ValidityPath::test(attribute, test),
                        test_validity,
                        summary,
                    );
                }

                self.publish(
                    &config,
                    ValidityPath::attribute(attribute),
                    attribute_validity,
                    summary,
                );
            }
        }

        self.publish(&config, ValidityPath::Root, model_validity, summary);
        tracing::debug!(
            valid = model_validity,
            run = summary.predicates_run - run,
            skipped = summary.predicates_skipped - skipped,
            writes = summary.writes - writes,
            events = summary.events - events,
            "validity pass complete"
        );
    }

    fn apply_override(
        &self,
        hook: Option<&dyn ValidityOverride>,
        attribute: &str,
        value: &Value,
        test: &str,
        validity: bool,
    ) -> bool {
        let Some(hook) = hook else {
            return validity;
        };
        hook.override_validity(&OverrideContext {
            attribute_name: attribute,
            attribute_value: value,
            model: &*self.subject,
            test_name: test,
            validity,
            validity_model: &*self.sink,
        })
    }

    fn publish(
        &self,
        config: &ValidityConfig,
        path: ValidityPath,
        validity: bool,
        summary: &mut PassSummary,
    ) {
        let valid_key = path.valid_key(&config.separator);
        if self.sink.get_bool(&valid_key) == Some(validity) {
            return;
        }
        let invalid_key = path.invalid_key(&config.separator);
        self.sink.set(&valid_key, Value::Bool(validity));
        self.sink.set(&invalid_key, Value::Bool(!validity));
        summary.writes += 1;
        tracing::trace!(key = %valid_key, validity, "validity flag written");

        if !config.emits_events() {
            return;
        }
        let event = RecordEvent::Validity(ValidityEvent::new(path, validity));
        if config.model_events {
            self.subject.trigger(&event);
            summary.events += 1;
        }
        let same_target = std::ptr::addr_eq(Rc::as_ptr(&self.subject), Rc::as_ptr(&self.sink));
        if config.validity_model_events && !(config.model_events && same_target) {
            self.sink.trigger(&event);
            summary.events += 1;
        }
    }
}

/// Marks a binding as mid-pass; released on drop, including unwind.
struct PassGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> PassGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self { flag })
        }
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
