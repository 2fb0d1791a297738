//! solspec - test specification inference for Foundry projects
//!
//! Reads a project's source and test trees, infers which source function
//! each test targets from naming conventions, and prints the result.

#![forbid(unsafe_code)]

mod commands;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::OutputFormat;
use solspec_common::{LogConfig, ResolvedConfig, init_logging, load_config};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

#[derive(Parser)]
#[command(name = "solspec")]
#[command(author, version, about = "Infer the test specification of a Solidity project")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Config file to use instead of <root>/solspec.toml
    #[arg(long, global = true, env = "SOLSPEC_CONFIG")]
    config: Option<PathBuf>,

    /// Source directory, relative to the root
    #[arg(long, global = true)]
    src: Option<PathBuf>,

    /// Test directory, relative to the root
    #[arg(long, global = true)]
    test: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the inferred specification (default)
    Spec {
        #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,
    },

    /// List how files under the test directory were categorized
    Files {
        #[arg(long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,
    },

    /// Only report diagnostics
    Check,
}

fn resolve_config(cli: &Cli) -> Result<ResolvedConfig> {
    let config = load_config(&cli.root, cli.config.as_deref())
        .with_context(|| format!("Failed to load configuration for {}", cli.root.display()))?
        .with_cli_overrides(cli.src.clone(), cli.test.clone());

    debug!(
        src = %config.src.value.display(),
        src_source = %config.src.source,
        test = %config.test.value.display(),
        test_source = %config.test.source,
        default_version = %config.default_version.value,
        default_version_source = %config.default_version.source,
        "effective_config"
    );
    Ok(config)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let mut log_config = LogConfig::from_env("info").with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logging_guards = init_logging(&log_config)?;

    let config = resolve_config(&cli)?;
    let diagnostics = match cli.command.unwrap_or(Commands::Spec {
        format: OutputFormat::Tree,
    }) {
        Commands::Spec { format } => commands::spec(&config, format)?,
        Commands::Files { format } => commands::files(&config, format)?,
        Commands::Check => commands::check(&config)?,
    };

    commands::log_diagnostics(&diagnostics);
    Ok(ExitCode::from(commands::exit_code(&diagnostics)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_defaults_to_spec() {
        let cli = Cli::try_parse_from(["solspec"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "solspec", "files", "--format", "json", "--root", "proj", "--src", "contracts", "-v",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Files {
                format: OutputFormat::Json
            })
        ));
        assert_eq!(cli.root, PathBuf::from("proj"));
        assert_eq!(cli.src, Some(PathBuf::from("contracts")));
        assert!(cli.verbose);
    }

    #[test]
    fn cli_overrides_win() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = Cli::try_parse_from([
            "solspec".into(),
            "check".into(),
            "--root".into(),
            dir.path().as_os_str().to_owned(),
            "--test".into(),
            "spec".into(),
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.test.value, PathBuf::from("spec"));
        assert_eq!(config.test.source, solspec_common::ConfigSource::CommandLine);
        assert_eq!(config.src.value, PathBuf::from("src"));
    }
}
