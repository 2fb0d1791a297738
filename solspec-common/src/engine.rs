//! Inference pipeline: classify, catalog, resolve, aggregate.
//!
//! The engine never touches the filesystem itself. Identifiers come from an
//! [`IdentifierSource`], so the pipeline can run over real Solidity files
//! ([`crate::extract::SolidityExtractor`]) or over in-memory fixtures.

use serde::Serialize;
use tracing::{debug, info};

use crate::catalog::{SourceCatalog, build_source_catalog};
use crate::classifier::categorize_files;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::naming::{TestFileName, resolve_file_scope};
use crate::report::{SpecificationReport, aggregate_specification};
use crate::scope::{FunctionRole, function_role, resolve_test_function};
use crate::types::{
    CategorizedFiles, ContractIdentifiers, SolidityFile, TestFile, TestFileIdentifiers,
};

/// Supplies declared contract and function names for a file.
///
/// `None` means the file could not be parsed; callers skip it.
pub trait IdentifierSource {
    fn contract_identifiers(&self, file: &SolidityFile) -> Option<Vec<ContractIdentifiers>>;

    fn test_file_identifiers(&self, file: &SolidityFile) -> Option<TestFileIdentifiers>;
}

/// Everything one run produces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecificationRun {
    pub categorized: CategorizedFiles,
    pub catalog: SourceCatalog,
    pub test_files: Vec<TestFile>,
    pub report: SpecificationReport,
    pub diagnostics: Diagnostics,
}

/// Resolve the file scope and every function of one test file.
pub fn resolve_test_file(
    file: &SolidityFile,
    identifiers: &TestFileIdentifiers,
    catalog: &SourceCatalog,
    diagnostics: &mut Diagnostics,
) -> TestFile {
    let path = file.path.to_string_lossy();
    let declared = identifiers.primary_contract_name().unwrap_or_default();

    if identifiers.has_multiple_contracts() {
        diagnostics.record(
            DiagnosticKind::MultipleContracts,
            format!("{path} declares multiple contracts, using {declared} for scope resolution"),
        );
    }

    let basename = file.basename();
    let scope = resolve_file_scope(&path, basename, declared, catalog, diagnostics);

    let mut tests = Vec::new();
    let mut set_ups = Vec::new();
    for name in &identifiers.function_names {
        match function_role(name) {
            FunctionRole::SetUp => set_ups.push(name.clone()),
            FunctionRole::Test => {
                tests.push(resolve_test_function(&path, &scope, name, catalog, diagnostics));
            }
            FunctionRole::Ignored => {
                debug!(path = %path, function = %name, "test_file_function_ignored");
            }
        }
    }

    TestFile {
        path: file.path.clone(),
        declared_contract_name: declared.to_string(),
        target_contract_name: TestFileName::parse(basename).source_part().to_string(),
        scope,
        tests,
        set_ups,
    }
}

/// Run the whole inference over already discovered files.
///
/// `source_files` feed the catalog, `test_tree_files` are partitioned and
/// only the test bucket is resolved. Output order follows input order.
pub fn infer_specification<S>(
    source_files: &[SolidityFile],
    test_tree_files: &[SolidityFile],
    source: &S,
) -> SpecificationRun
where
    S: IdentifierSource + ?Sized,
{
    let mut diagnostics = Diagnostics::new();

    let categorized = categorize_files(test_tree_files, &mut diagnostics);
    let catalog = build_source_catalog(source_files, source);

    let mut test_files = Vec::with_capacity(categorized.test_files.len());
    for file in &categorized.test_files {
        let Some(identifiers) = source.test_file_identifiers(file) else {
            debug!(path = %file.path.display(), "test_file_skipped_unparsable");
            continue;
        };
        test_files.push(resolve_test_file(file, &identifiers, &catalog, &mut diagnostics));
    }

    let report = aggregate_specification(&catalog, &test_files);
    let summary = report.summary();
    info!(
        source_files = source_files.len(),
        test_tree_files = test_tree_files.len(),
        contracts = summary.contracts,
        tests = summary.tests,
        tested_functions = summary.tested_functions,
        functions = summary.functions,
        unlinked = summary.unlinked_contracts,
        errors = diagnostics.errors().count(),
        warnings = diagnostics.warnings().count(),
        "specification_inferred"
    );

    SpecificationRun {
        categorized,
        catalog,
        test_files,
        report,
        diagnostics,
    }
}
