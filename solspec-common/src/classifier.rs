//! Partition of the files found under the test root.
//!
//! Rules are checked in priority order and the first match wins:
//!
//! 1. path contains `Setup` → setup
//! 2. basename contains `Helper`, `Utils`, `Util`, `Mock` or `Harness` → utility
//! 3. path contains `.t.sol` → test
//! 4. anything else → unclassified (error diagnostic)

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::types::{CategorizedFiles, SolidityFile};

/// Marker for files holding shared test setup.
const SETUP_MARKER: &str = "Setup";

/// Basename markers for helper/mock/harness code under the test root.
const UTILITY_MARKERS: &[&str] = &["Helper", "Utils", "Util", "Mock", "Harness"];

/// Forge's test file suffix.
const TEST_FILE_MARKER: &str = ".t.sol";

/// Bucket a single file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    Test,
    Setup,
    Utility,
    Unclassified,
}

/// Decide the category of one file. Pure; see [`categorize_files`] for
/// the diagnostics that accompany the decision.
pub fn classify_file(file: &SolidityFile) -> FileCategory {
    let path = file.path.to_string_lossy();
    if path.contains(SETUP_MARKER) {
        FileCategory::Setup
    } else if is_utility_name(file.basename()) {
        FileCategory::Utility
    } else if path.contains(TEST_FILE_MARKER) {
        FileCategory::Test
    } else {
        FileCategory::Unclassified
    }
}

fn is_utility_name(basename: &str) -> bool {
    UTILITY_MARKERS
        .iter()
        .any(|marker| basename.contains(marker))
}

/// Split `files` into the four disjoint buckets, preserving input order
/// within each bucket.
pub fn categorize_files(files: &[SolidityFile], diagnostics: &mut Diagnostics) -> CategorizedFiles {
    let mut categorized = CategorizedFiles::default();

    for file in files {
        let category = classify_file(file);
        debug!(path = %file.path.display(), category = ?category, "file_classified");

        match category {
            FileCategory::Setup => categorized.setup_files.push(file.clone()),
            FileCategory::Utility => {
                if file.path.to_string_lossy().contains(TEST_FILE_MARKER) {
                    diagnostics.record(
                        DiagnosticKind::UtilityNamedAsTest,
                        format!("{file} is named as a test file but is a utility file"),
                    );
                }
                categorized.utils_files.push(file.clone());
            }
            FileCategory::Test => categorized.test_files.push(file.clone()),
            FileCategory::Unclassified => {
                diagnostics.record(
                    DiagnosticKind::UnclassifiedFile,
                    format!("{file} was not identified as a test, setup or utility"),
                );
                categorized.unclassified.push(file.clone());
            }
        }
    }

    categorized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sol(path: &str) -> SolidityFile {
        SolidityFile::new(path, "0.8.22")
    }

    #[test]
    fn setup_wins_over_test_suffix() {
        assert_eq!(classify_file(&sol("test/BaseSetup.t.sol")), FileCategory::Setup);
        assert_eq!(classify_file(&sol("test/Setup/Vault.t.sol")), FileCategory::Setup);
    }

    #[test]
    fn utility_markers_match_basename_only() {
        assert_eq!(classify_file(&sol("test/mocks/MockToken.sol")), FileCategory::Utility);
        assert_eq!(classify_file(&sol("test/VaultHarness.sol")), FileCategory::Utility);
        assert_eq!(classify_file(&sol("test/TestUtil.sol")), FileCategory::Utility);
        assert_eq!(classify_file(&sol("test/Helpers/Vault.t.sol")), FileCategory::Test);
        // Case-sensitive.
        assert_eq!(classify_file(&sol("test/mock.sol")), FileCategory::Unclassified);
    }

    #[test]
    fn test_suffix_is_required_for_tests() {
        assert_eq!(classify_file(&sol("test/Vault.t.sol")), FileCategory::Test);
        assert_eq!(classify_file(&sol("test/Vault.sol")), FileCategory::Unclassified);
    }

    #[test]
    fn unclassified_files_raise_errors() {
        let mut diagnostics = Diagnostics::new();
        let categorized = categorize_files(&[sol("test/Random.sol")], &mut diagnostics);

        assert_eq!(categorized.unclassified.len(), 1);
        assert!(diagnostics.contains_message(
            "Random.sol (0.8.22) was not identified as a test, setup or utility"
        ));
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn utility_named_as_test_is_reported_not_reclassified() {
        let mut diagnostics = Diagnostics::new();
        let categorized =
            categorize_files(&[sol("test/VaultHelper.t.sol")], &mut diagnostics);

        assert_eq!(categorized.utils_files.len(), 1);
        assert!(categorized.test_files.is_empty());
        assert!(diagnostics.contains_message(
            "VaultHelper.t.sol (0.8.22) is named as a test file but is a utility file"
        ));
    }

    #[test]
    fn partition_preserves_order_and_totality() {
        let files = vec![
            sol("test/A.t.sol"),
            sol("test/Setup.sol"),
            sol("test/B.t.sol"),
            sol("test/MockA.sol"),
            sol("test/C.sol"),
        ];
        let mut diagnostics = Diagnostics::new();
        let categorized = categorize_files(&files, &mut diagnostics);

        assert_eq!(categorized.len(), files.len());
        assert_eq!(categorized.test_files, vec![sol("test/A.t.sol"), sol("test/B.t.sol")]);
        assert_eq!(categorized.setup_files.len(), 1);
        assert_eq!(categorized.utils_files.len(), 1);
        assert_eq!(categorized.unclassified.len(), 1);
    }
}
