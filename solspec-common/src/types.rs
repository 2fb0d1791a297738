//! Common types used across solspec components.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Solidity version assumed when a file carries no `pragma solidity` line.
pub const DEFAULT_SOLIDITY_VERSION: &str = "0.8.22";

/// A discovered `.sol` file. Identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolidityFile {
    pub path: PathBuf,
    /// Version declared by the file's pragma, or the configured default.
    pub version: String,
}

impl SolidityFile {
    pub fn new(path: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            version: version.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without directories, e.g. `Vault.deposit.t.sol`.
    pub fn basename(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for SolidityFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.basename(), self.version)
    }
}

/// One contract declaration extracted from a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractIdentifiers {
    pub contract_name: String,
    pub function_names: Vec<String>,
}

impl ContractIdentifiers {
    pub fn new(contract_name: impl Into<String>, function_names: Vec<String>) -> Self {
        Self {
            contract_name: contract_name.into(),
            function_names,
        }
    }
}

/// Identifiers extracted from a test file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFileIdentifiers {
    /// Every contract declared in the file, in source order.
    pub declared_contract_names: Vec<String>,
    /// Every function declared in the file, in source order.
    pub function_names: Vec<String>,
}

impl TestFileIdentifiers {
    /// The contract used for scope resolution: the first one declared.
    pub fn primary_contract_name(&self) -> Option<&str> {
        self.declared_contract_names.first().map(String::as_str)
    }

    /// Test files are expected to declare a single contract.
    pub fn has_multiple_contracts(&self) -> bool {
        self.declared_contract_names.len() > 1
    }
}

/// Inferred target of a test file or a single test function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum Scope {
    /// The whole source contract.
    Contract(String),
    /// A single source function.
    Function(String),
    /// A named group of tests not tied to one function.
    Feature(String),
    Unknown,
}

impl Scope {
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Contract(target) | Self::Function(target) | Self::Feature(target) => {
                Some(target)
            }
            Self::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Contract(_) => "contract",
            Self::Function(_) => "function",
            Self::Feature(_) => "feature",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.target() {
            Some(target) => write!(f, "{}({})", self.kind(), target),
            None => write!(f, "{}", self.kind()),
        }
    }
}

/// A single test function with its resolved scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFunction {
    pub name: String,
    pub scope: Scope,
}

impl TestFunction {
    pub fn new(name: impl Into<String>, scope: Scope) -> Self {
        Self {
            name: name.into(),
            scope,
        }
    }
}

/// A test file after scope resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFile {
    pub path: PathBuf,
    /// First contract declared in the file (empty when none was found).
    pub declared_contract_name: String,
    /// Source contract the file is named after (first basename segment).
    pub target_contract_name: String,
    pub scope: Scope,
    pub tests: Vec<TestFunction>,
    /// Setup hooks, kept apart from the tests.
    pub set_ups: Vec<String>,
}

/// Partition of the files found under the test root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizedFiles {
    pub test_files: Vec<SolidityFile>,
    pub setup_files: Vec<SolidityFile>,
    pub utils_files: Vec<SolidityFile>,
    pub unclassified: Vec<SolidityFile>,
}

impl CategorizedFiles {
    /// Number of files across all four buckets.
    pub fn len(&self) -> usize {
        self.test_files.len()
            + self.setup_files.len()
            + self.utils_files.len()
            + self.unclassified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
