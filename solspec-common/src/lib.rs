//! Test specification inference for Solidity projects.
//!
//! Given the contracts under a project's source tree and the files under its
//! test tree, solspec works out which source function each test exercises,
//! purely from Foundry naming conventions, and builds a per-contract report
//! that also shows functions without any test.

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod diagnostics;
pub mod discovery;
pub mod engine;
pub mod errors;
pub mod extract;
pub mod logging;
pub mod naming;
pub mod report;
pub mod scope;
pub mod testing;
pub mod types;

pub use catalog::{SourceCatalog, build_source_catalog};
pub use classifier::{FileCategory, categorize_files, classify_file};
pub use config::{ConfigSource, ResolvedConfig, Sourced, load_config};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use discovery::{ProjectFiles, discover_files, discover_project};
pub use engine::{IdentifierSource, SpecificationRun, infer_specification, resolve_test_file};
pub use errors::{Result, SpecError};
pub use extract::SolidityExtractor;
pub use logging::{LogConfig, LogFormat, LoggingError, LoggingGuards, init_logging};
pub use naming::{resolve_file_scope, to_camel_case};
pub use report::{
    ContractSpecification, ReportSummary, SpecificationReport, aggregate_specification,
};
pub use scope::{resolve_test_function, resolve_test_scope};
pub use types::{
    CategorizedFiles, ContractIdentifiers, DEFAULT_SOLIDITY_VERSION, Scope, SolidityFile,
    TestFile, TestFileIdentifiers, TestFunction,
};
