//! Human-readable and JSON rendering of a specification run.

use colored::Colorize;
use serde::Serialize;
use solspec_common::{
    CategorizedFiles, ContractSpecification, Diagnostics, ReportSummary, Severity, SolidityFile,
    SpecificationReport, TestFunction,
};

use crate::commands::helpers::{indent_lines, pluralize};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn new(label: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    fn leaf(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }

    fn render(&self, out: &mut String) {
        out.push_str(&self.label);
        out.push('\n');
        render_children(&self.children, "", out);
    }
}

fn render_children(children: &[TreeNode], prefix: &str, out: &mut String) {
    for (idx, child) in children.iter().enumerate() {
        let last = idx + 1 == children.len();
        out.push_str(prefix);
        out.push_str(if last { LAST_BRANCH } else { BRANCH });
        out.push_str(&child.label);
        out.push('\n');
        let child_prefix = format!("{prefix}{}", if last { SPACE } else { PIPE });
        render_children(&child.children, &child_prefix, out);
    }
}

fn test_leaves(tests: &[TestFunction]) -> Vec<TreeNode> {
    tests.iter().map(|test| TreeNode::leaf(&test.name)).collect()
}

fn contract_node(name: &str, specification: &ContractSpecification) -> TreeNode {
    let mut children = Vec::new();

    for (function, tests) in &specification.functions {
        if tests.is_empty() {
            children.push(TreeNode::leaf(format!(
                "{} {}",
                function.as_str().yellow(),
                "(untested)".dimmed()
            )));
        } else {
            children.push(TreeNode::new(
                function.as_str().green().to_string(),
                test_leaves(tests),
            ));
        }
    }
    for (feature, tests) in &specification.features {
        children.push(TreeNode::new(
            format!("{} {}", "feature".cyan(), feature),
            test_leaves(tests),
        ));
    }
    if !specification.unidentified.is_empty() {
        children.push(TreeNode::new(
            "unidentified".red().to_string(),
            test_leaves(&specification.unidentified),
        ));
    }

    TreeNode::new(name.bold().to_string(), children)
}

/// Render the report as one tree per contract, then the unlinked section
/// and a summary line.
pub fn render_report(report: &SpecificationReport) -> String {
    let mut out = String::new();
    for (name, specification) in &report.contracts {
        contract_node(name, specification).render(&mut out);
        out.push('\n');
    }

    if !report.unlinked.is_empty() {
        out.push_str(&format!(
            "{}\n\n",
            "Tests without a matching source contract".red().bold()
        ));
        for (name, specification) in &report.unlinked {
            contract_node(name, specification).render(&mut out);
            out.push('\n');
        }
    }

    out.push_str(&render_summary(&report.summary()));
    out.push('\n');
    out
}

pub fn render_summary(summary: &ReportSummary) -> String {
    format!(
        "{}, {}/{} functions tested, {}, {}",
        pluralize(summary.contracts, "contract"),
        summary.tested_functions,
        summary.functions,
        pluralize(summary.tests, "test"),
        pluralize(summary.unlinked_contracts, "unlinked contract"),
    )
}

fn file_line(file: &SolidityFile) -> String {
    format!(
        "{} {}",
        file.path.display(),
        format!("({})", file.version).dimmed()
    )
}

/// List the four buckets of the test tree.
pub fn render_files(categorized: &CategorizedFiles) -> String {
    let sections = [
        ("Tests", &categorized.test_files),
        ("Setup", &categorized.setup_files),
        ("Utilities", &categorized.utils_files),
        ("Unclassified", &categorized.unclassified),
    ];

    let mut out = String::new();
    for (title, files) in sections {
        out.push_str(&format!("{} ({})\n", title.bold(), files.len()));
        if !files.is_empty() {
            let listing = files.iter().map(file_line).collect::<Vec<_>>().join("\n");
            out.push_str(&indent_lines(&listing, "  "));
            out.push('\n');
        }
    }
    out
}

/// One line per diagnostic followed by the totals.
pub fn render_diagnostics(diagnostics: &Diagnostics) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics.iter() {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        out.push_str(&format!(
            "{severity}[{}]: {}\n",
            diagnostic.code(),
            diagnostic.message
        ));
    }

    let errors = diagnostics.errors().count();
    let warnings = diagnostics.warnings().count();
    if errors == 0 && warnings == 0 {
        out.push_str(&format!("{}\n", "No problems found".green()));
    } else {
        out.push_str(&format!(
            "{}, {}\n",
            pluralize(errors, "error"),
            pluralize(warnings, "warning")
        ));
    }
    out
}

#[derive(Serialize)]
pub struct SpecOutput<'a> {
    pub summary: ReportSummary,
    pub report: &'a SpecificationReport,
    pub diagnostics: &'a Diagnostics,
}

#[derive(Serialize)]
pub struct FilesOutput<'a> {
    pub files: &'a CategorizedFiles,
    pub diagnostics: &'a Diagnostics,
}
