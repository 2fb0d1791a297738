//! Solidity file discovery.
//!
//! Walks a directory tree, keeps `.sol` files and reads each file's
//! `pragma solidity` line to learn its compiler version. Output is sorted by
//! path so repeated runs see files in the same order.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;
use walkdir::WalkDir;

use crate::config::ResolvedConfig;
use crate::errors::{Result, SpecError};
use crate::types::SolidityFile;

const SOLIDITY_EXTENSION: &str = "sol";

/// `pragma solidity ^0.8.20;`, `>=0.8.0 <0.9.0`, `0.8.22`. The first full
/// version in the constraint is taken.
static PRAGMA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*pragma\s+solidity\s+[^;\d]*(\d+\.\d+\.\d+)[^;]*;")
        .expect("pragma regex is valid")
});

/// Version declared by a `pragma solidity` line, if any.
pub fn pragma_version(source: &str) -> Option<&str> {
    PRAGMA_RE
        .captures(source)
        .and_then(|captures| captures.get(1))
        .map(|version| version.as_str())
}

/// Every `.sol` file under `root`, sorted by path.
///
/// Files without a readable pragma get `default_version`.
pub fn discover_files(root: &Path, default_version: &str) -> Result<Vec<SolidityFile>> {
    if !root.is_dir() {
        return Err(SpecError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|source| SpecError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|ext| ext.to_str()) != Some(SOLIDITY_EXTENSION)
        {
            continue;
        }

        let version = read_version(path).unwrap_or_else(|| default_version.to_string());
        files.push(SolidityFile::new(path, version));
    }

    files.sort();
    debug!(root = %root.display(), files = files.len(), "files_discovered");
    Ok(files)
}

fn read_version(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => pragma_version(&contents).map(str::to_string),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "pragma_read_failed");
            None
        }
    }
}

/// Source and test-tree files of one project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFiles {
    pub source_files: Vec<SolidityFile>,
    pub test_tree_files: Vec<SolidityFile>,
}

/// Discover both trees named by `config`.
///
/// Paths are made relative to the project root, so classification only
/// ever sees the project's own directory names.
pub fn discover_project(config: &ResolvedConfig) -> Result<ProjectFiles> {
    let version = config.default_version.value.as_str();
    let source_files = discover_files(&config.src_root(), version)?;
    let test_tree_files = discover_files(&config.test_root(), version)?;

    Ok(ProjectFiles {
        source_files: relative_to(&config.root, source_files),
        test_tree_files: relative_to(&config.root, test_tree_files),
    })
}

fn relative_to(root: &Path, files: Vec<SolidityFile>) -> Vec<SolidityFile> {
    files
        .into_iter()
        .map(|file| {
            let path = file
                .path
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| file.path.clone());
            SolidityFile::new(path, file.version)
        })
        .collect()
}

/// Resolve a discovered path back to a readable location.
pub fn absolute_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
