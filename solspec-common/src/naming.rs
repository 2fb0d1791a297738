//! File-level scope from naming conventions.
//!
//! Three conventions are recognised, shown for a source contract `Vault`
//! with a function `deposit`:
//!
//! | File                   | Declared contract | Scope              |
//! |------------------------|-------------------|--------------------|
//! | `Vault.t.sol`          | `VaultTest`       | Contract(Vault)    |
//! | `Vault.deposit.t.sol`  | `Deposit`         | Function(deposit)  |
//! | `Vault.Security.t.sol` | `Security`        | Feature(Security)  |
//!
//! The contract convention is checked first and short-circuits the others,
//! so it also resolves files whose source contract is missing from the
//! catalog. Those land in the report's unlinked table.

use tracing::debug;

use crate::catalog::SourceCatalog;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::types::Scope;

/// Suffix of contract-scoped test contracts (`VaultTest`).
const CONTRACT_TEST_SUFFIX: &str = "Test";

/// Basename split on `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestFileName<'a> {
    segments: [Option<&'a str>; 4],
    segment_count: usize,
}

impl<'a> TestFileName<'a> {
    pub fn parse(basename: &'a str) -> Self {
        let mut segments = [None; 4];
        let mut segment_count = 0;
        for (index, segment) in basename.split('.').enumerate() {
            if let Some(slot) = segments.get_mut(index) {
                *slot = Some(segment);
            }
            segment_count += 1;
        }
        Self {
            segments,
            segment_count,
        }
    }

    /// First segment, the source contract the file is named after.
    pub fn source_part(&self) -> &'a str {
        self.segments[0].unwrap_or_default()
    }

    pub fn second_part(&self) -> Option<&'a str> {
        self.segments[1]
    }

    /// `<source>.<second>.t.sol`, exactly four segments.
    pub fn is_segmented_test_name(&self) -> bool {
        self.segment_count == 4
            && self.segments[2] == Some("t")
            && self.segments[3] == Some("sol")
    }
}

/// Decide the scope of a test file from its basename and its first declared
/// contract.
///
/// Pure apart from diagnostics: the same inputs always yield the same scope.
pub fn resolve_file_scope(
    path: &str,
    basename: &str,
    contract_name: &str,
    catalog: &SourceCatalog,
    diagnostics: &mut Diagnostics,
) -> Scope {
    let name = TestFileName::parse(basename);
    let source_part = name.source_part();

    let scope = match_convention(&name, contract_name, catalog);
    debug!(
        path,
        source = source_part,
        contract = contract_name,
        scope = %scope,
        "file_scope_resolved"
    );

    if scope.is_unknown() {
        diagnostics.record(
            DiagnosticKind::FileScope,
            format!("Unable to determine scope for test file {path}"),
        );
    }
    scope
}

fn match_convention(
    name: &TestFileName<'_>,
    contract_name: &str,
    catalog: &SourceCatalog,
) -> Scope {
    let source_part = name.source_part();

    if !source_part.is_empty()
        && contract_name.strip_suffix(CONTRACT_TEST_SUFFIX) == Some(source_part)
    {
        return Scope::Contract(source_part.to_string());
    }

    if !catalog.contains_contract(source_part) || !name.is_segmented_test_name() {
        return Scope::Unknown;
    }

    let Some(second_part) = name.second_part() else {
        return Scope::Unknown;
    };

    if to_camel_case(contract_name) == second_part && catalog.contains_function(second_part) {
        Scope::Function(second_part.to_string())
    } else if contract_name == second_part {
        Scope::Feature(second_part.to_string())
    } else {
        Scope::Unknown
    }
}

/// Convert an identifier to lower camel case.
///
/// Words are split on non-alphanumeric separators, lower-to-upper case
/// changes, the end of an acronym, and letter/digit boundaries:
/// `Deposit` → `deposit`, `TransferFrom` → `transferFrom`,
/// `ERC20Permit` → `erc20Permit`, `set_fee` → `setFee`.
pub fn to_camel_case(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for (index, word) in split_words(input).iter().enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            result.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.push_str(chars.as_str());
        }
    }
    result
}

fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in input.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && is_word_boundary(chars[i - 1], c, chars.get(i + 1).copied()) {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

fn is_word_boundary(prev: char, current: char, next: Option<char>) -> bool {
    let lower_to_upper =
        (prev.is_lowercase() || prev.is_ascii_digit()) && current.is_uppercase();
    let acronym_end = prev.is_uppercase()
        && current.is_uppercase()
        && next.is_some_and(char::is_lowercase);
    let letter_digit = prev.is_alphabetic() && current.is_ascii_digit();
    let digit_letter = prev.is_ascii_digit() && current.is_lowercase();
    lower_to_upper || acronym_end || letter_digit || digit_letter
}
