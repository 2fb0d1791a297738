//! Lightweight Solidity identifier extraction.
//!
//! This is not a parser. Comments and string literals are blanked out, then
//! a single regex pass walks declarations, `function` names and braces.
//! Functions belong to the declaration whose body directly encloses them.
//! Interfaces are skipped since they have no implementation to test. In
//! test files only `contract` and `abstract contract` definitions count.

use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;
use tracing::debug;

use crate::discovery::absolute_path;
use crate::engine::IdentifierSource;
use crate::types::{ContractIdentifiers, SolidityFile, TestFileIdentifiers};

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        \b(?P<kind>abstract\s+contract|contract|library|interface)\s+(?P<name>[A-Za-z_$][A-Za-z0-9_$]*)
        | \bfunction\s+(?P<function>[A-Za-z_$][A-Za-z0-9_$]*)
        | (?P<open>\{)
        | (?P<close>\})
        | (?P<paren_open>\()
        | (?P<paren_close>\))
        ",
    )
    .expect("token regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclarationKind {
    Contract,
    Library,
    Interface,
}

impl DeclarationKind {
    fn parse(keyword: &str) -> Self {
        match keyword {
            "library" => Self::Library,
            "interface" => Self::Interface,
            _ => Self::Contract,
        }
    }
}

#[derive(Debug)]
struct Declaration {
    kind: DeclarationKind,
    name: String,
    functions: Vec<String>,
}

#[derive(Debug)]
struct OpenBody {
    declaration: Declaration,
    depth: usize,
}

/// Every contract and library declared in `source`, with the functions
/// declared directly in its body. `None` when braces do not balance.
pub fn extract_contracts(source: &str) -> Option<Vec<ContractIdentifiers>> {
    let declarations = scan_declarations(source)?;
    Some(
        declarations
            .into_iter()
            .filter(|declaration| declaration.kind != DeclarationKind::Interface)
            .map(|declaration| ContractIdentifiers::new(declaration.name, declaration.functions))
            .collect(),
    )
}

/// Declared contract names and their functions in a test file, in source
/// order. Libraries and interfaces are left out. `None` when braces do not
/// balance.
pub fn extract_test_identifiers(source: &str) -> Option<TestFileIdentifiers> {
    let mut identifiers = TestFileIdentifiers::default();
    for declaration in scan_declarations(source)? {
        if declaration.kind != DeclarationKind::Contract {
            continue;
        }
        identifiers.declared_contract_names.push(declaration.name);
        identifiers.function_names.extend(declaration.functions);
    }
    Some(identifiers)
}

fn scan_declarations(source: &str) -> Option<Vec<Declaration>> {
    let code = strip_comments_and_strings(source);
    let mut finished = Vec::new();
    let mut pending: Option<Declaration> = None;
    let mut current: Option<OpenBody> = None;
    let mut depth = 0usize;
    // Braces inside an inheritance list, e.g. `is B({x: 1})`, are not a body.
    let mut parens = 0usize;

    for captures in TOKEN_RE.captures_iter(&code) {
        if let (Some(kind), Some(name)) = (captures.name("kind"), captures.name("name")) {
            if current.is_none() {
                pending = Some(Declaration {
                    kind: DeclarationKind::parse(kind.as_str().split_whitespace().last()?),
                    name: name.as_str().to_string(),
                    functions: Vec::new(),
                });
            }
        } else if let Some(function) = captures.name("function") {
            if let Some(body) = current.as_mut().filter(|body| body.depth == depth) {
                body.declaration.functions.push(function.as_str().to_string());
            }
        } else if captures.name("open").is_some() {
            depth += 1;
            if current.is_none() && parens == 0 {
                if let Some(declaration) = pending.take() {
                    current = Some(OpenBody { declaration, depth });
                }
            }
        } else if captures.name("paren_open").is_some() {
            parens += 1;
        } else if captures.name("paren_close").is_some() {
            parens = parens.saturating_sub(1);
        } else if captures.name("close").is_some() {
            if depth == 0 {
                return None;
            }
            if current.as_ref().is_some_and(|body| body.depth == depth) {
                if let Some(body) = current.take() {
                    finished.push(body.declaration);
                }
            }
            depth -= 1;
        }
    }

    (depth == 0).then_some(finished)
}

/// Replace comments and string literal contents with spaces, keeping line
/// structure intact.
fn strip_comments_and_strings(source: &str) -> String {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum State {
        Code,
        LineComment,
        BlockComment,
        Str(char),
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Code;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::Code => match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '"' | '\'' => {
                    out.push(c);
                    state = State::Str(c);
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    out.push('\n');
                    state = State::Code;
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Code;
                } else {
                    out.push(if c == '\n' { '\n' } else { ' ' });
                }
            }
            State::Str(quote) => {
                if c == '\\' {
                    chars.next();
                    out.push_str("  ");
                } else if c == quote {
                    out.push(c);
                    state = State::Code;
                } else {
                    out.push(if c == '\n' { '\n' } else { ' ' });
                }
            }
        }
    }
    out
}

/// [`IdentifierSource`] reading files from disk.
///
/// Relative file paths are resolved against `root`.
#[derive(Debug, Clone)]
pub struct SolidityExtractor {
    root: PathBuf,
}

impl SolidityExtractor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, file: &SolidityFile) -> Option<String> {
        let path = absolute_path(&self.root, &file.path);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "solidity_read_failed");
                None
            }
        }
    }
}

impl IdentifierSource for SolidityExtractor {
    fn contract_identifiers(&self, file: &SolidityFile) -> Option<Vec<ContractIdentifiers>> {
        let contracts = extract_contracts(&self.read(file)?);
        if contracts.is_none() {
            debug!(path = %file.path.display(), "unbalanced_braces");
        }
        contracts
    }

    fn test_file_identifiers(&self, file: &SolidityFile) -> Option<TestFileIdentifiers> {
        let identifiers = extract_test_identifiers(&self.read(file)?);
        if identifiers.is_none() {
            debug!(path = %file.path.display(), "unbalanced_braces");
        }
        identifiers
    }
}
