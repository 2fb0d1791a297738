//! Environment variable parsing with type safety.
//!
//! Provides a type-safe parser for `SOLSPEC_*` environment variables with
//! validation, error collection, and source tracking.

use super::source::Sourced;
use regex::Regex;
use std::env;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\d+\.\d+$").expect("version regex is valid"));

/// Whether `value` is a plain `X.Y.Z` version.
pub fn is_solidity_version(value: &str) -> bool {
    VERSION_RE.is_match(value)
}

/// Errors that can occur during environment variable parsing.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Invalid value for a variable.
    #[error("Invalid value for {var}: expected {expected}, got '{value}'")]
    InvalidValue {
        var: String,
        expected: String,
        value: String,
    },

    /// Invalid log level.
    #[error("Invalid log level for {var}: {value}")]
    InvalidLogLevel { var: String, value: String },
}

/// Type-safe environment variable parser.
///
/// Collects errors during parsing so all issues can be reported at once.
pub struct EnvParser {
    prefix: &'static str,
    errors: Vec<EnvError>,
}

impl EnvParser {
    /// Create a new parser with the SOLSPEC_ prefix.
    pub fn new() -> Self {
        Self {
            prefix: "SOLSPEC_",
            errors: Vec::new(),
        }
    }

    pub fn errors(&self) -> &[EnvError] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Take ownership of errors.
    pub fn take_errors(&mut self) -> Vec<EnvError> {
        std::mem::take(&mut self.errors)
    }

    fn var_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Get an optional string (None if not set or empty).
    pub fn get_optional_string(&mut self, name: &str) -> Sourced<Option<String>> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) if value.is_empty() => Sourced::from_env(None, var_name),
            Ok(value) => Sourced::from_env(Some(value), var_name),
            Err(_) => Sourced::default_value(None),
        }
    }

    /// Get an optional path (None if not set or empty).
    pub fn get_optional_path(&mut self, name: &str) -> Sourced<Option<PathBuf>> {
        let value = self.get_optional_string(name);
        Sourced {
            value: value.value.map(PathBuf::from),
            source: value.source,
            env_var: value.env_var,
        }
    }

    /// Get an optional `X.Y.Z` Solidity version.
    pub fn get_optional_version(&mut self, name: &str) -> Sourced<Option<String>> {
        let Sourced {
            value,
            source,
            env_var,
        } = self.get_optional_string(name);
        match value.map(|raw| raw.trim().to_string()) {
            Some(version) if !is_solidity_version(&version) => {
                self.errors.push(EnvError::InvalidValue {
                    var: self.var_name(name),
                    expected: "semantic version X.Y.Z".to_string(),
                    value: version,
                });
                Sourced::default_value(None)
            }
            version => Sourced {
                value: version,
                source,
                env_var,
            },
        }
    }

    /// Get a log level value with validation.
    pub fn get_log_level(&mut self, name: &str, default: &str) -> Sourced<String> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) => {
                let lower = value.to_lowercase();
                match lower.as_str() {
                    "trace" | "debug" | "info" | "warn" | "error" | "off" => {
                        Sourced::from_env(lower, var_name)
                    }
                    _ => {
                        self.errors.push(EnvError::InvalidLogLevel {
                            var: var_name.clone(),
                            value: value.clone(),
                        });
                        Sourced::from_env(default.to_string(), var_name)
                    }
                }
            }
            Err(_) => Sourced::default_value(default.to_string()),
        }
    }

    /// Get one of a fixed set of lowercase choices.
    pub fn get_choice(
        &mut self,
        name: &str,
        choices: &[&'static str],
        default: &'static str,
    ) -> Sourced<&'static str> {
        let var_name = self.var_name(name);
        match env::var(&var_name) {
            Ok(value) => {
                let lower = value.to_lowercase();
                match choices.iter().find(|choice| **choice == lower) {
                    Some(choice) => Sourced::from_env(*choice, var_name),
                    None => {
                        self.errors.push(EnvError::InvalidValue {
                            var: var_name.clone(),
                            expected: format!("one of {}", choices.join("/")),
                            value,
                        });
                        Sourced::from_env(default, var_name)
                    }
                }
            }
            Err(_) => Sourced::default_value(default),
        }
    }
}

impl Default for EnvParser {
    fn default() -> Self {
        Self::new()
    }
}
