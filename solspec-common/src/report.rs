//! Specification report: catalog functions joined with resolved tests.
//!
//! Every catalog contract gets an entry seeded with one empty test list per
//! declared function, so untested functions stay visible. Test files whose
//! target contract is absent from the catalog are collected in a separate
//! unlinked table with the same shape.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::catalog::SourceCatalog;
use crate::types::{Scope, TestFile, TestFunction};

/// Tests grouped by what they exercise within one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContractSpecification {
    /// Catalog functions first (in declaration order), then any function
    /// first named by a test.
    pub functions: IndexMap<String, Vec<TestFunction>>,
    pub features: IndexMap<String, Vec<TestFunction>>,
    pub unidentified: Vec<TestFunction>,
}

impl ContractSpecification {
    fn seeded(functions: &[String]) -> Self {
        let mut specification = Self::default();
        for function in functions {
            specification.functions.entry(function.clone()).or_default();
        }
        specification
    }

    fn route(&mut self, test: TestFunction) {
        match &test.scope {
            Scope::Function(target) => {
                let target = target.clone();
                self.functions.entry(target).or_default().push(test);
            }
            Scope::Feature(feature) => {
                let feature = feature.clone();
                self.features.entry(feature).or_default().push(test);
            }
            // Resolution never yields a contract-wide test scope, but a
            // hand-built one names no function or feature to file it under.
            Scope::Contract(contract) => {
                debug!(
                    test = %test.name,
                    contract = %contract,
                    "contract_scoped_test_unidentified"
                );
                self.unidentified.push(test);
            }
            Scope::Unknown => self.unidentified.push(test),
        }
    }

    /// Functions with no test, in report order.
    pub fn untested_functions(&self) -> impl Iterator<Item = &str> {
        self.functions
            .iter()
            .filter(|(_, tests)| tests.is_empty())
            .map(|(name, _)| name.as_str())
    }

    pub fn test_count(&self) -> usize {
        self.functions.values().map(Vec::len).sum::<usize>()
            + self.features.values().map(Vec::len).sum::<usize>()
            + self.unidentified.len()
    }
}

/// Totals across a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub contracts: usize,
    pub functions: usize,
    pub tested_functions: usize,
    pub tests: usize,
    pub features: usize,
    pub unidentified_tests: usize,
    pub unlinked_contracts: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecificationReport {
    /// Catalog contracts, in catalog order.
    pub contracts: IndexMap<String, ContractSpecification>,
    /// Test targets missing from the catalog, in first-seen order.
    pub unlinked: IndexMap<String, ContractSpecification>,
}

impl SpecificationReport {
    /// Report with catalog entries only, no tests routed yet.
    pub fn seeded(catalog: &SourceCatalog) -> Self {
        let contracts = catalog
            .iter()
            .map(|(name, functions)| (name.to_string(), ContractSpecification::seeded(functions)))
            .collect();
        Self {
            contracts,
            unlinked: IndexMap::new(),
        }
    }

    /// Route every test of `file` into its contract's entry.
    pub fn add_test_file(&mut self, file: &TestFile) {
        let target = &file.target_contract_name;
        let specification = match self.contracts.get_mut(target) {
            Some(specification) => specification,
            None => {
                debug!(
                    path = %file.path.display(),
                    contract = %target,
                    "test_file_unlinked"
                );
                self.unlinked.entry(target.clone()).or_default()
            }
        };
        for test in &file.tests {
            specification.route(test.clone());
        }
    }

    pub fn contract(&self, name: &str) -> Option<&ContractSpecification> {
        self.contracts.get(name)
    }

    pub fn unlinked_contract(&self, name: &str) -> Option<&ContractSpecification> {
        self.unlinked.get(name)
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            contracts: self.contracts.len(),
            unlinked_contracts: self.unlinked.len(),
            ..ReportSummary::default()
        };
        for specification in self.contracts.values().chain(self.unlinked.values()) {
            summary.functions += specification.functions.len();
            summary.tested_functions += specification
                .functions
                .values()
                .filter(|tests| !tests.is_empty())
                .count();
            summary.features += specification.features.len();
            summary.unidentified_tests += specification.unidentified.len();
            summary.tests += specification.test_count();
        }
        summary
    }
}

/// Join the catalog with every resolved test file.
pub fn aggregate_specification(
    catalog: &SourceCatalog,
    files: &[TestFile],
) -> SpecificationReport {
    let mut report = SpecificationReport::seeded(catalog);
    for file in files {
        report.add_test_file(file);
    }
    report
}
