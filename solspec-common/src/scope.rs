//! Per-test scope resolution.
//!
//! A test inherits or refines the scope of its file:
//!
//! - Contract file: the source function is read from the test name
//!   (`test_deposit_...` → `deposit`) and must exist in the catalog.
//! - Function file: every test targets the file's function.
//! - Feature file: a test naming a catalog function targets that function,
//!   any other test stays on the feature.
//! - Unknown file: every test is unknown.

use regex::Regex;
use std::sync::LazyLock;

use crate::catalog::SourceCatalog;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::types::{Scope, TestFunction};

/// Lifecycle hooks collected apart from tests.
pub const SETUP_FUNCTIONS: &[&str] = &["setUp", "_setUp", "_afterSetup", "_beforeSetup"];

/// Revert-path tests never name a source function through their prefix.
const REVERT_MARKERS: &[&str] = &["RevertIf", "RevertWhen", "RevertOn"];

const TEST_PREFIX: &str = "test";

static CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^test(?:Fork)?(?:Fuzz)?_([a-z][A-Za-z]*)").expect("candidate regex is valid")
});

/// How a function found in a test contract is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionRole {
    SetUp,
    Test,
    /// Helpers and anything else; dropped without a diagnostic.
    Ignored,
}

pub fn function_role(name: &str) -> FunctionRole {
    if SETUP_FUNCTIONS.contains(&name) {
        FunctionRole::SetUp
    } else if name.starts_with(TEST_PREFIX) {
        FunctionRole::Test
    } else {
        FunctionRole::Ignored
    }
}

/// Source function name encoded in a test name, if any.
///
/// `testFuzz_withdraw_Bounds` → `withdraw`. Names carrying a revert marker
/// (`test_RevertIf_...`, `test_deposit_RevertWhen...`) yield nothing.
pub fn extract_function_candidate(test_name: &str) -> Option<&str> {
    if REVERT_MARKERS
        .iter()
        .any(|marker| test_name.contains(marker))
    {
        return None;
    }
    CANDIDATE_RE
        .captures(test_name)
        .and_then(|captures| captures.get(1))
        .map(|candidate| candidate.as_str())
}

fn catalog_function(test_name: &str, catalog: &SourceCatalog) -> Option<String> {
    extract_function_candidate(test_name)
        .filter(|candidate| catalog.contains_function(candidate))
        .map(str::to_string)
}

/// Scope of one test given its file's scope. Pure.
pub fn resolve_test_scope(file_scope: &Scope, test_name: &str, catalog: &SourceCatalog) -> Scope {
    match file_scope {
        Scope::Contract(_) => catalog_function(test_name, catalog)
            .map(Scope::Function)
            .unwrap_or(Scope::Unknown),
        Scope::Function(target) => Scope::Function(target.clone()),
        Scope::Feature(feature) => catalog_function(test_name, catalog)
            .map(Scope::Function)
            .unwrap_or_else(|| Scope::Feature(feature.clone())),
        Scope::Unknown => Scope::Unknown,
    }
}

/// Resolve one test and record a warning when its target stays unknown.
pub fn resolve_test_function(
    path: &str,
    file_scope: &Scope,
    test_name: &str,
    catalog: &SourceCatalog,
    diagnostics: &mut Diagnostics,
) -> TestFunction {
    let scope = resolve_test_scope(file_scope, test_name, catalog);
    if scope.is_unknown() {
        diagnostics.record(
            DiagnosticKind::TestFunctionScope,
            format!("Unable to determine source function name for test {test_name} in {path}"),
        );
    }
    TestFunction::new(test_name, scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContractIdentifiers;

    fn catalog() -> SourceCatalog {
        vec![ContractIdentifiers::new(
            "Vault",
            vec!["deposit".to_string(), "withdraw".to_string()],
        )]
        .into_iter()
        .collect()
    }

    fn contract_scope() -> Scope {
        Scope::Contract("Vault".to_string())
    }

    #[test]
    fn roles() {
        assert_eq!(function_role("setUp"), FunctionRole::SetUp);
        assert_eq!(function_role("_beforeSetup"), FunctionRole::SetUp);
        assert_eq!(function_role("_afterSetup"), FunctionRole::SetUp);
        assert_eq!(function_role("test_deposit"), FunctionRole::Test);
        assert_eq!(function_role("testFuzz_deposit"), FunctionRole::Test);
        assert_eq!(function_role("_deployVault"), FunctionRole::Ignored);
        assert_eq!(function_role("invariant_solvency"), FunctionRole::Ignored);
    }

    #[test]
    fn candidate_extraction() {
        assert_eq!(extract_function_candidate("test_deposit"), Some("deposit"));
        assert_eq!(
            extract_function_candidate("test_deposit_RevertsIfZero"),
            Some("deposit")
        );
        assert_eq!(
            extract_function_candidate("testFuzz_withdraw_Bounds"),
            Some("withdraw")
        );
        assert_eq!(
            extract_function_candidate("testForkFuzz_transferFrom_x"),
            Some("transferFrom")
        );
        assert_eq!(extract_function_candidate("test_NoReentrancy"), None);
        assert_eq!(extract_function_candidate("testDeposit"), None);
        assert_eq!(extract_function_candidate("test_RevertIf_AmountZero"), None);
        assert_eq!(
            extract_function_candidate("test_deposit_RevertWhen_Paused"),
            None
        );
        assert_eq!(extract_function_candidate("test_withdraw_RevertOnZero"), None);
    }

    #[test]
    fn contract_scope_extracts_known_function() {
        let scope = resolve_test_scope(&contract_scope(), "test_deposit_RevertsIfZero", &catalog());
        assert_eq!(scope, Scope::Function("deposit".to_string()));
    }

    #[test]
    fn contract_scope_unknown_function_warns() {
        let mut diagnostics = Diagnostics::new();
        let test = resolve_test_function(
            "test/Vault.t.sol",
            &contract_scope(),
            "test_pause",
            &catalog(),
            &mut diagnostics,
        );
        assert_eq!(test.scope, Scope::Unknown);
        assert!(diagnostics.contains_message(
            "Unable to determine source function name for test test_pause in test/Vault.t.sol"
        ));
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn function_scope_is_inherited_verbatim() {
        let file_scope = Scope::Function("deposit".to_string());
        for name in ["test_RevertIf_AmountZero", "test_withdraw", "testAnything"] {
            assert_eq!(
                resolve_test_scope(&file_scope, name, &catalog()),
                Scope::Function("deposit".to_string())
            );
        }
    }

    #[test]
    fn feature_scope_overrides_to_function_when_possible() {
        let file_scope = Scope::Feature("Security".to_string());
        assert_eq!(
            resolve_test_scope(&file_scope, "testFuzz_withdraw_Bounds", &catalog()),
            Scope::Function("withdraw".to_string())
        );
        assert_eq!(
            resolve_test_scope(&file_scope, "test_NoReentrancy", &catalog()),
            Scope::Feature("Security".to_string())
        );
    }

    #[test]
    fn unknown_file_scope_makes_every_test_unknown() {
        let mut diagnostics = Diagnostics::new();
        for name in ["test_deposit", "test_withdraw"] {
            let test =
                resolve_test_function("t.sol", &Scope::Unknown, name, &catalog(), &mut diagnostics);
            assert_eq!(test.scope, Scope::Unknown);
        }
        assert_eq!(diagnostics.warnings().count(), 2);
    }
}
