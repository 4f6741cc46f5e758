#![forbid(unsafe_code)]

//! Policy-as-data: load [`ConfigurationOptions`] from TOML or JSON.
//!
//! Keys use snake_case; the camelCase spellings (`modelEvents`,
//! `validationProperty`, `validityModelEvents`) are accepted as aliases.
//! The override hook cannot be expressed in a file and is never loaded.
//!
//! ```toml
//! lazy = false
//! separator = "#"
//! model_events = true
//! ```

use std::path::Path;

use super::ConfigurationOptions;
use crate::error::{Result, ValidityError};

impl ConfigurationOptions {
    /// Parse options from a TOML document.
    ///
    /// # Errors
    ///
    /// [`ValidityError::ConfigParse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|err| ValidityError::ConfigParse {
            origin: "TOML".to_string(),
            message: err.to_string(),
        })
    }

    /// Parse options from a JSON document.
    ///
    /// # Errors
    ///
    /// [`ValidityError::ConfigParse`] on malformed JSON or unknown keys.
    pub fn from_json_str(source: &str) -> Result<Self> {
        serde_json::from_str(source).map_err(|err| ValidityError::ConfigParse {
            origin: "JSON".to_string(),
            message: err.to_string(),
        })
    }

    /// Load options from a file, choosing the format by extension
    /// (`.json` is JSON, anything else is TOML).
    ///
    /// # Errors
    ///
    /// [`ValidityError::Io`] if the file cannot be read, otherwise the
    /// errors of the matching `from_*_str` parser.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ValidityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        tracing::debug!(path = %path.display(), is_json, "loading validity configuration");
        if is_json {
            Self::from_json_str(&source)
        } else {
            Self::from_toml_str(&source)
        }
    }
}
