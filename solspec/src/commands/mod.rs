//! Command implementations for the solspec CLI.

pub mod helpers;

use anyhow::{Context, Result};
use clap::ValueEnum;
use solspec_common::{
    Diagnostics, ResolvedConfig, Severity, SolidityExtractor, SpecificationRun, discover_project,
    infer_specification,
};
use tracing::{debug, error, warn};

use crate::render::{self, FilesOutput, SpecOutput};

/// Output format for commands that print results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored tree for terminals
    #[default]
    Tree,
    /// Pretty-printed JSON
    Json,
}

/// Discover, extract and infer for the configured project.
pub fn run_inference(config: &ResolvedConfig) -> Result<SpecificationRun> {
    debug!(
        src = %config.src_root().display(),
        test = %config.test_root().display(),
        "discovering_project"
    );
    let project = discover_project(config).context("Failed to discover Solidity files")?;
    let extractor = SolidityExtractor::new(&config.root);
    Ok(infer_specification(
        &project.source_files,
        &project.test_tree_files,
        &extractor,
    ))
}

pub fn spec(config: &ResolvedConfig, format: OutputFormat) -> Result<Diagnostics> {
    let run = run_inference(config)?;
    let output = match format {
        OutputFormat::Tree => render::render_report(&run.report),
        OutputFormat::Json => serde_json::to_string_pretty(&SpecOutput {
            summary: run.report.summary(),
            report: &run.report,
            diagnostics: &run.diagnostics,
        })
        .context("Failed to serialize specification")?,
    };
    println!("{output}");
    Ok(run.diagnostics)
}

pub fn files(config: &ResolvedConfig, format: OutputFormat) -> Result<Diagnostics> {
    let run = run_inference(config)?;
    let output = match format {
        OutputFormat::Tree => render::render_files(&run.categorized),
        OutputFormat::Json => serde_json::to_string_pretty(&FilesOutput {
            files: &run.categorized,
            diagnostics: &run.diagnostics,
        })
        .context("Failed to serialize file categories")?,
    };
    println!("{output}");
    Ok(run.diagnostics)
}

pub fn check(config: &ResolvedConfig) -> Result<Diagnostics> {
    let run = run_inference(config)?;
    print!("{}", render::render_diagnostics(&run.diagnostics));
    Ok(run.diagnostics)
}

/// Emit every diagnostic as a tracing event at its severity.
pub fn log_diagnostics(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity {
            Severity::Error => error!(code = diagnostic.code(), "{}", diagnostic.message),
            Severity::Warning => warn!(code = diagnostic.code(), "{}", diagnostic.message),
        }
    }
}

/// Process exit code for a finished run: 1 when any error was recorded.
pub fn exit_code(diagnostics: &Diagnostics) -> u8 {
    u8::from(diagnostics.has_errors())
}
