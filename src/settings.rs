//! Site settings.
//!
//! Settings are a flat mapping of upper-case keys to values, the way site
//! configuration files are usually written. They are read from TOML.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::style::DEFAULT_STYLE;

/// Path of the bibliography file. Absent or empty disables publications.
pub const PUBLICATIONS_SRC: &str = "PUBLICATIONS_SRC";

/// What to do with entries whose index is missing or not an integer.
pub const PUBLICATIONS_INDEX_POLICY: &str = "PUBLICATIONS_INDEX_POLICY";

/// Name of the builtin citation style.
pub const PUBLICATIONS_STYLE: &str = "PUBLICATIONS_STYLE";

/// Errors that can occur when loading or reading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Handling of entries without a usable ordering index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexPolicy {
    /// Abort the build
    #[default]
    Strict,
    /// Log a warning and leave the entry out
    Skip,
}

/// Site settings mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    values: Map<String, Value>,
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    /// Loads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let values: Map<String, Value> = toml::from_str(content)?;
        Ok(Settings { values })
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// The configured bibliography path, if publications are enabled.
    ///
    /// Returns None when the key is absent, empty or not a string.
    pub fn publications_src(&self) -> Option<&str> {
        self.get_str(PUBLICATIONS_SRC)
            .filter(|src| !src.trim().is_empty())
    }

    /// The configured index policy, `strict` when unset.
    pub fn index_policy(&self) -> Result<IndexPolicy, SettingsError> {
        match self.get(PUBLICATIONS_INDEX_POLICY) {
            None => Ok(IndexPolicy::Strict),
            Some(Value::String(s)) if s == "strict" => Ok(IndexPolicy::Strict),
            Some(Value::String(s)) if s == "skip" => Ok(IndexPolicy::Skip),
            Some(other) => Err(invalid(PUBLICATIONS_INDEX_POLICY, other)),
        }
    }

    /// The configured style name, the default style when unset.
    pub fn style_name(&self) -> Result<&str, SettingsError> {
        match self.get(PUBLICATIONS_STYLE) {
            None => Ok(DEFAULT_STYLE),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(other) => Err(invalid(PUBLICATIONS_STYLE, other)),
        }
    }
}

fn invalid(key: &str, value: &Value) -> SettingsError {
    SettingsError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}
