//! Infrastructure errors for solspec.
//!
//! These cover the I/O around the engine: locating roots, walking
//! directories and loading configuration. Problems found *inside* the
//! Solidity tree are never errors of this type; they are collected as
//! [`Diagnostic`](crate::Diagnostic)s instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::EnvError;

#[derive(Debug, Error)]
pub enum SpecError {
    /// Source or test root does not exist.
    #[error("Root directory not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Directory traversal failed.
    #[error("Failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// Configuration file exists but could not be read.
    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for the expected schema.
    #[error("Failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Configuration file parsed but a value is out of range.
    #[error("Invalid {key} in {path}: expected {expected}, got {value:?}")]
    ConfigValue {
        path: PathBuf,
        key: &'static str,
        expected: &'static str,
        value: String,
    },

    /// One or more environment overrides were rejected.
    #[error("Invalid environment configuration: {}", format_env_errors(.0))]
    Env(Vec<EnvError>),
}

fn format_env_errors(errors: &[EnvError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, SpecError>;
