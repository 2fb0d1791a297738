//! Configuration system for solspec.
//!
//! Values are layered, lowest precedence first:
//! - built-in defaults (`src`, `test`, Solidity `0.8.22`)
//! - `[profile.default]` in the project's `foundry.toml`
//! - `solspec.toml` at the project root, or an explicit `--config` file
//! - `SOLSPEC_SRC`, `SOLSPEC_TEST`, `SOLSPEC_DEFAULT_VERSION`
//! - command-line flags, applied by the caller through [`ResolvedConfig`]

pub mod env;
pub mod source;

pub use env::{EnvError, EnvParser, is_solidity_version};
pub use source::{ConfigSource, Sourced};

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{Result, SpecError};
use crate::types::DEFAULT_SOLIDITY_VERSION;

/// Project-level config file name.
pub const CONFIG_FILE_NAME: &str = "solspec.toml";

/// Foundry manifest consulted for source and test directories.
pub const FOUNDRY_FILE_NAME: &str = "foundry.toml";

/// Shape of `solspec.toml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolspecFile {
    pub paths: PathsSection,
    pub solidity: SoliditySection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsSection {
    pub src: Option<PathBuf>,
    pub test: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SoliditySection {
    pub default_version: Option<String>,
}

/// Fully layered configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub root: PathBuf,
    /// Source directory, relative to `root` unless absolute.
    pub src: Sourced<PathBuf>,
    /// Test directory, relative to `root` unless absolute.
    pub test: Sourced<PathBuf>,
    pub default_version: Sourced<String>,
}

impl ResolvedConfig {
    /// Defaults only, rooted at `root`.
    pub fn defaults(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            src: Sourced::default_value(PathBuf::from("src")),
            test: Sourced::default_value(PathBuf::from("test")),
            default_version: Sourced::default_value(DEFAULT_SOLIDITY_VERSION.to_string()),
        }
    }

    pub fn src_root(&self) -> PathBuf {
        self.root.join(&self.src.value)
    }

    pub fn test_root(&self) -> PathBuf {
        self.root.join(&self.test.value)
    }

    /// Apply command-line overrides.
    pub fn with_cli_overrides(mut self, src: Option<PathBuf>, test: Option<PathBuf>) -> Self {
        self.src.override_with(src, ConfigSource::CommandLine);
        self.test.override_with(test, ConfigSource::CommandLine);
        self
    }

    fn apply_file(&mut self, file: SolspecFile, source: ConfigSource) {
        self.src.override_with(file.paths.src, source);
        self.test.override_with(file.paths.test, source);
        self.default_version
            .override_with(file.solidity.default_version, source);
    }

    fn apply_env(&mut self, parser: &mut EnvParser) {
        let src = parser.get_optional_path("SRC");
        if let (Some(value), Some(var)) = (src.value, src.env_var) {
            self.src = Sourced::from_env(value, var);
        }
        let test = parser.get_optional_path("TEST");
        if let (Some(value), Some(var)) = (test.value, test.env_var) {
            self.test = Sourced::from_env(value, var);
        }
        let version = parser.get_optional_version("DEFAULT_VERSION");
        if let (Some(value), Some(var)) = (version.value, version.env_var) {
            self.default_version = Sourced::from_env(value, var);
        }
    }
}

/// Load configuration for the project at `root`.
///
/// `explicit` names a config file that must exist; otherwise `solspec.toml`
/// is read only when present.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<ResolvedConfig> {
    let mut config = ResolvedConfig::defaults(root);

    let foundry_path = root.join(FOUNDRY_FILE_NAME);
    if foundry_path.is_file() {
        let contents = read_config(&foundry_path)?;
        let foundry = parse_foundry_profile(&foundry_path, &contents)?;
        config.apply_file(foundry, ConfigSource::FoundryToml);
    }

    let config_path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(CONFIG_FILE_NAME)).filter(|path| path.is_file()),
    };
    if let Some(path) = config_path {
        let contents = read_config(&path)?;
        let file = parse_solspec_file(&path, &contents)?;
        config.apply_file(file, ConfigSource::ConfigFile);
    }

    let mut parser = EnvParser::new();
    config.apply_env(&mut parser);
    if parser.has_errors() {
        return Err(SpecError::Env(parser.take_errors()));
    }

    debug!(
        root = %config.root.display(),
        src = %config.src.value.display(),
        src_source = %config.src.source,
        test = %config.test.value.display(),
        test_source = %config.test.source,
        default_version = %config.default_version.value,
        "config_resolved"
    );
    Ok(config)
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| SpecError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse `solspec.toml` contents.
pub fn parse_solspec_file(path: &Path, contents: &str) -> Result<SolspecFile> {
    let mut file =
        toml::from_str::<SolspecFile>(contents).map_err(|source| SpecError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;

    if let Some(version) = file.solidity.default_version.take() {
        let version = version.trim().to_string();
        if !is_solidity_version(&version) {
            return Err(SpecError::ConfigValue {
                path: path.to_path_buf(),
                key: "solidity.default_version",
                expected: "semantic version X.Y.Z",
                value: version,
            });
        }
        file.solidity.default_version = Some(version);
    }
    Ok(file)
}

/// Pull `src`/`test` out of `foundry.toml`'s `[profile.default]`.
///
/// Foundry manifests carry many unrelated keys, so the table is read
/// loosely; non-string values are ignored.
pub fn parse_foundry_profile(path: &Path, contents: &str) -> Result<SolspecFile> {
    let table = toml::from_str::<toml::Table>(contents).map_err(|source| {
        SpecError::ConfigParse {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let profile = table
        .get("profile")
        .and_then(|profile| profile.get("default"))
        .and_then(|default| default.as_table());
    let string_key = |key: &str| {
        profile
            .and_then(|profile| profile.get(key))
            .and_then(|value| value.as_str())
            .map(PathBuf::from)
    };

    Ok(SolspecFile {
        paths: PathsSection {
            src: string_key("src"),
            test: string_key("test"),
        },
        solidity: SoliditySection::default(),
    })
}

#[cfg(test)]
pub(crate) fn env_test_lock() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
