//! Diagnostics raised while inferring a specification.
//!
//! Nothing here aborts a run. Every problem is recorded, the offending file
//! or test is routed to an unknown bucket, and processing continues. The
//! caller inspects the collected set at the end of the run.
//!
//! # Diagnostic Codes
//!
//! | Code      | Kind                | Severity |
//! |-----------|---------------------|----------|
//! | SPEC-E001 | Unclassified file   | error    |
//! | SPEC-E002 | Utility named test  | error    |
//! | SPEC-E003 | File scope          | error    |
//! | SPEC-W001 | Test function scope | warning  |
//! | SPEC-W002 | Multiple contracts  | warning  |

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// What went wrong, with a stable code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// File under the test root is neither test, setup nor utility
    UnclassifiedFile,
    /// Utility file carries the `.t.sol` test suffix
    UtilityNamedAsTest,
    /// No naming convention matched the test file
    FileScope,
    /// No source function could be inferred for a test
    TestFunctionScope,
    /// Test file declares more than one contract
    MultipleContracts,
}

impl DiagnosticKind {
    /// Stable code in the `SPEC-Xnnn` format.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnclassifiedFile => "SPEC-E001",
            Self::UtilityNamedAsTest => "SPEC-E002",
            Self::FileScope => "SPEC-E003",
            Self::TestFunctionScope => "SPEC-W001",
            Self::MultipleContracts => "SPEC-W002",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::UnclassifiedFile | Self::UtilityNamedAsTest | Self::FileScope => {
                Severity::Error
            }
            Self::TestFunctionScope | Self::MultipleContracts => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)
    }
}

/// Append-only, message-deduplicated diagnostics set for one run.
///
/// The first diagnostic recorded for a given message wins; later duplicates
/// are dropped. Iteration follows insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: IndexMap<String, Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic. Returns `false` when the message was already present.
    pub fn push(&mut self, diagnostic: Diagnostic) -> bool {
        if self.entries.contains_key(&diagnostic.message) {
            return false;
        }
        debug!(
            code = diagnostic.code(),
            severity = %diagnostic.severity,
            message = %diagnostic.message,
            "diagnostic_recorded"
        );
        self.entries.insert(diagnostic.message.clone(), diagnostic);
        true
    }

    pub fn record(&mut self, kind: DiagnosticKind, message: impl Into<String>) -> bool {
        self.push(Diagnostic::new(kind, message))
    }

    /// Fold another set into this one, keeping first-seen order.
    pub fn merge(&mut self, other: Diagnostics) {
        for (_, diagnostic) in other.entries {
            self.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.values()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_message(&self, message: &str) -> bool {
        self.entries.contains_key(message)
    }
}

impl Serialize for Diagnostics {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.entries.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_messages_are_dropped() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.record(DiagnosticKind::FileScope, "same"));
        assert!(!diagnostics.record(DiagnosticKind::FileScope, "same"));
        assert!(!diagnostics.record(DiagnosticKind::TestFunctionScope, "same"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics.iter().next().map(|d| d.severity),
            Some(Severity::Error)
        );
    }

    #[test]
    fn errors_and_warnings_are_split_by_severity() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.record(DiagnosticKind::TestFunctionScope, "w1");
        assert!(!diagnostics.has_errors());
        diagnostics.record(DiagnosticKind::UnclassifiedFile, "e1");
        diagnostics.record(DiagnosticKind::MultipleContracts, "w2");

        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.errors().count(), 1);
        assert_eq!(
            diagnostics.warnings().map(|d| d.message.as_str()).collect::<Vec<_>>(),
            vec!["w1", "w2"]
        );
    }

    #[test]
    fn merge_preserves_first_seen_order() {
        let mut left = Diagnostics::new();
        left.record(DiagnosticKind::FileScope, "a");
        let mut right = Diagnostics::new();
        right.record(DiagnosticKind::FileScope, "b");
        right.record(DiagnosticKind::FileScope, "a");

        left.merge(right);
        let messages = left.iter().map(|d| d.message.as_str()).collect::<Vec<_>>();
        assert_eq!(messages, vec!["a", "b"]);
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(DiagnosticKind::UnclassifiedFile.code(), "SPEC-E001");
        assert_eq!(DiagnosticKind::MultipleContracts.code(), "SPEC-W002");
        let diagnostic = Diagnostic::new(DiagnosticKind::FileScope, "boom");
        assert_eq!(diagnostic.to_string(), "[SPEC-E003] boom");
    }
}
