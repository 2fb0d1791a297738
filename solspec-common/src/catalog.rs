//! Source catalog: every contract declared under the source root, mapped to
//! the functions it declares.
//!
//! Contracts keep first-seen order. A name declared in several files is
//! merged optimistically by appending function lists; duplicates are kept.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::engine::IdentifierSource;
use crate::types::{ContractIdentifiers, SolidityFile};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SourceCatalog {
    contracts: IndexMap<String, Vec<String>>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one contract declaration into the catalog.
    pub fn insert(&mut self, contract: ContractIdentifiers) {
        self.contracts
            .entry(contract.contract_name)
            .or_default()
            .extend(contract.function_names);
    }

    pub fn contains_contract(&self, name: &str) -> bool {
        self.contracts.contains_key(name)
    }

    /// Declared functions of `contract`, duplicates included.
    pub fn functions(&self, contract: &str) -> Option<&[String]> {
        self.contracts.get(contract).map(Vec::as_slice)
    }

    /// Whether any catalog contract declares `function`.
    pub fn contains_function(&self, function: &str) -> bool {
        self.contracts
            .values()
            .any(|functions| functions.iter().any(|name| name == function))
    }

    /// Contracts in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.contracts
            .iter()
            .map(|(name, functions)| (name.as_str(), functions.as_slice()))
    }

    pub fn contract_names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl FromIterator<ContractIdentifiers> for SourceCatalog {
    fn from_iter<I: IntoIterator<Item = ContractIdentifiers>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for contract in iter {
            catalog.insert(contract);
        }
        catalog
    }
}

/// Build the catalog from the files under the source root.
///
/// Files the identifier source cannot parse are skipped; the parser is
/// expected to have reported them already.
pub fn build_source_catalog<S>(files: &[SolidityFile], source: &S) -> SourceCatalog
where
    S: IdentifierSource + ?Sized,
{
    let mut catalog = SourceCatalog::new();
    for file in files {
        let Some(contracts) = source.contract_identifiers(file) else {
            debug!(path = %file.path.display(), "source_file_skipped_unparsable");
            continue;
        };
        for contract in contracts {
            debug!(
                path = %file.path.display(),
                contract = %contract.contract_name,
                functions = contract.function_names.len(),
                "catalog_contract_added"
            );
            catalog.insert(contract);
        }
    }
    catalog
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(name: &str, functions: &[&str]) -> ContractIdentifiers {
        ContractIdentifiers::new(
            name,
            functions.iter().map(|f| f.to_string()).collect(),
        )
    }

    #[test]
    fn repeated_contracts_append_functions() {
        let catalog: SourceCatalog = vec![
            contract("Vault", &[]),
            contract("Token", &["mint"]),
            contract("Vault", &["deposit", "withdraw"]),
            contract("Vault", &["deposit"]),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.functions("Vault"),
            Some(&["deposit".to_string(), "withdraw".to_string(), "deposit".to_string()][..])
        );
        assert_eq!(catalog.contract_names().collect::<Vec<_>>(), vec!["Vault", "Token"]);
    }

    #[test]
    fn empty_contracts_are_still_cataloged() {
        let catalog: SourceCatalog = vec![contract("Empty", &[])].into_iter().collect();
        assert!(catalog.contains_contract("Empty"));
        assert_eq!(catalog.functions("Empty"), Some(&[][..]));
    }

    #[test]
    fn function_lookup_spans_every_contract() {
        let catalog: SourceCatalog = vec![
            contract("Vault", &["deposit"]),
            contract("Token", &["mint"]),
        ]
        .into_iter()
        .collect();
        assert!(catalog.contains_function("mint"));
        assert!(catalog.contains_function("deposit"));
        assert!(!catalog.contains_function("burn"));
    }
}
