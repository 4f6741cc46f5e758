#![forbid(unsafe_code)]

//! Validity configuration: the live global default and per-binding snapshots.
//!
//! The global configuration is thread-local, like the runtime's other
//! process-wide contexts. It is only read when a binding is created (or
//! explicitly refreshed): every [`ValidityBinding`] runs its passes against
//! its own [`ValidityConfig`] snapshot, so reconfiguring never changes a
//! binding behind its back.
//!
//! ```
//! use vmodel_runtime::config::{self, ConfigurationOptions};
//!
//! config::configure(ConfigurationOptions::new().lazy(false).separator("#"));
//! let current = config::current_configuration();
//! assert!(!current.lazy);
//! assert_eq!(current.separator, "#");
//!
//! config::reset_configuration();
//! assert_eq!(config::current_configuration().separator, "/");
//! ```
//!
//! [`ValidityBinding`]: crate::ValidityBinding

#[cfg(feature = "policy-config")]
mod file;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use vmodel_core::{DEFAULT_SEPARATOR, ValidityOverride};

use crate::error::{Result, ValidityError};

/// Property name under which subjects expose their test declaration.
pub const DEFAULT_VALIDATION_PROPERTY: &str = "validation";

thread_local! {
    static GLOBAL_CONFIG: RefCell<ValidityConfig> = RefCell::new(ValidityConfig::default());
}

/// Complete validity configuration.
#[derive(Clone)]
pub struct ValidityConfig {
    /// Master switch for event emission. Writes happen regardless.
    pub events: bool,
    /// Skip the remaining tests of an attribute once one has failed.
    pub lazy: bool,
    /// Emit validity events on the subject.
    pub model_events: bool,
    /// Joins path segments in record keys and event names.
    pub separator: String,
    /// Property holding the subject's test declaration.
    pub validation_property: String,
    /// Emit validity events on the validity sink.
    pub validity_model_events: bool,
    /// Override applied to every test. `None` delegates to the subject's own
    /// override when it has one, and is the identity otherwise.
    pub validity_override: Option<Rc<dyn ValidityOverride>>,
}

impl Default for ValidityConfig {
    fn default() -> Self {
        Self {
            events: true,
            lazy: true,
            model_events: true,
            separator: DEFAULT_SEPARATOR.to_string(),
            validation_property: DEFAULT_VALIDATION_PROPERTY.to_string(),
            validity_model_events: true,
            validity_override: None,
        }
    }
}

impl fmt::Debug for ValidityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidityConfig")
            .field("events", &self.events)
            .field("lazy", &self.lazy)
            .field("model_events", &self.model_events)
            .field("separator", &self.separator)
            .field("validation_property", &self.validation_property)
            .field("validity_model_events", &self.validity_model_events)
            .field("validity_override", &self.validity_override.is_some())
            .finish()
    }
}

impl ValidityConfig {
    /// Shallow-merge `options` into this configuration.
    pub fn merge(&mut self, options: ConfigurationOptions) {
        let ConfigurationOptions {
            events,
            lazy,
            model_events,
            separator,
            validation_property,
            validity_model_events,
            validity_override,
        } = options;
        if let Some(events) = events {
            self.events = events;
        }
        if let Some(lazy) = lazy {
            self.lazy = lazy;
        }
        if let Some(model_events) = model_events {
            self.model_events = model_events;
        }
        if let Some(separator) = separator {
            self.separator = separator;
        }
        if let Some(property) = validation_property {
            self.validation_property = property;
        }
        if let Some(validity_model_events) = validity_model_events {
            self.validity_model_events = validity_model_events;
        }
        if validity_override.is_some() {
            self.validity_override = validity_override;
        }
    }

    /// Builder-style [`merge`](Self::merge).
    #[must_use]
    pub fn merged(mut self, options: ConfigurationOptions) -> Self {
        self.merge(options);
        self
    }

    /// Check that this configuration can drive a binding.
    ///
    /// # Errors
    ///
    /// [`ValidityError::InvalidArgument`] when the separator or the
    /// validation property is empty.
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(ValidityError::InvalidArgument(
                "separator must not be empty".to_string(),
            ));
        }
        if self.validation_property.is_empty() {
            return Err(ValidityError::InvalidArgument(
                "validation property must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether any event target is enabled.
    #[must_use]
    pub fn emits_events(&self) -> bool {
        self.events && (self.model_events || self.validity_model_events)
    }
}

/// Partial configuration: every `Some` field replaces the current value.
#[derive(Clone, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default, deny_unknown_fields))]
pub struct ConfigurationOptions {
    pub events: Option<bool>,
    pub lazy: Option<bool>,
    #[cfg_attr(feature = "policy-config", serde(alias = "modelEvents"))]
    pub model_events: Option<bool>,
    pub separator: Option<String>,
    #[cfg_attr(feature = "policy-config", serde(alias = "validationProperty"))]
    pub validation_property: Option<String>,
    #[cfg_attr(feature = "policy-config", serde(alias = "validityModelEvents"))]
    pub validity_model_events: Option<bool>,
    #[cfg_attr(feature = "policy-config", serde(skip))]
    pub validity_override: Option<Rc<dyn ValidityOverride>>,
}

impl ConfigurationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(mut self, events: bool) -> Self {
        self.events = Some(events);
        self
    }

    #[must_use]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = Some(lazy);
        self
    }

    #[must_use]
    pub fn model_events(mut self, enabled: bool) -> Self {
        self.model_events = Some(enabled);
        self
    }

    #[must_use]
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    #[must_use]
    pub fn validation_property(mut self, property: impl Into<String>) -> Self {
        self.validation_property = Some(property.into());
        self
    }

    #[must_use]
    pub fn validity_model_events(mut self, enabled: bool) -> Self {
        self.validity_model_events = Some(enabled);
        self
    }

    #[must_use]
    pub fn validity_override(mut self, hook: impl ValidityOverride + 'static) -> Self {
        self.validity_override = Some(Rc::new(hook));
        self
    }
}

impl fmt::Debug for ConfigurationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigurationOptions")
            .field("events", &self.events)
            .field("lazy", &self.lazy)
            .field("model_events", &self.model_events)
            .field("separator", &self.separator)
            .field("validation_property", &self.validation_property)
            .field("validity_model_events", &self.validity_model_events)
            .field("validity_override", &self.validity_override.is_some())
            .finish()
    }
}

/// Shallow-merge `options` into the global configuration.
///
/// Affects bindings created (or refreshed) afterwards on this thread.
pub fn configure(options: ConfigurationOptions) {
    tracing::debug!(?options, "configure validity");
    GLOBAL_CONFIG.with(|config| config.borrow_mut().merge(options));
}

/// Restore the global configuration to its defaults.
pub fn reset_configuration() {
    GLOBAL_CONFIG.with(|config| *config.borrow_mut() = ValidityConfig::default());
}

/// Snapshot of the global configuration.
#[must_use]
pub fn current_configuration() -> ValidityConfig {
    GLOBAL_CONFIG.with(|config| config.borrow().clone())
}
