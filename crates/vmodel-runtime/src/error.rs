#![forbid(unsafe_code)]

//! Error types for binding and configuration.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unusable configuration | Empty separator or validation property | `bind`/`reconfigure` fail, nothing is subscribed |
//! | Malformed config file | Bad TOML/JSON, unknown key | `ConfigParse` |
//! | Unreadable config file | I/O error | `Io` |
//! | Predicate panic | Test code panicked | Propagates; the pass stops where it was |

#[cfg(feature = "policy-config")]
use std::path::PathBuf;

/// Errors from the validity runtime.
#[derive(Debug, thiserror::Error)]
pub enum ValidityError {
    /// A precondition of `bind` or `reconfigure` was violated.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A configuration document could not be parsed.
    #[cfg(feature = "policy-config")]
    #[error("failed to parse {origin} configuration: {message}")]
    ConfigParse { origin: String, message: String },

    /// A configuration file could not be read.
    #[cfg(feature = "policy-config")]
    #[error("failed to read configuration from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ValidityError>;
