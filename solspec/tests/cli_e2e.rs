//! Runs the built `solspec` binary against projects on disk.

use solspec_common::testing::init_test_logging;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

#[ctor::ctor]
fn setup() {
    init_test_logging();
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "src/Vault.sol",
        "pragma solidity ^0.8.20;\ncontract Vault {\n  function deposit() external {}\n  function withdraw() external {}\n}\n",
    );
    write(
        dir.path(),
        "test/Vault.t.sol",
        "contract VaultTest {\n  function setUp() public {}\n  function test_deposit() public {}\n}\n",
    );
    dir
}

fn solspec(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_solspec"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env("NO_COLOR", "1")
        .env_remove("SOLSPEC_SRC")
        .env_remove("SOLSPEC_TEST")
        .env_remove("SOLSPEC_CONFIG")
        .env_remove("SOLSPEC_LOG_LEVEL")
        .output()
        .expect("solspec binary runs")
}

#[test]
fn default_command_prints_the_tree() {
    let dir = project();
    let output = solspec(dir.path(), &[]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Vault\n├── deposit\n│   └── test_deposit\n└── withdraw (untested)"));
    assert!(stdout.contains("1 contract, 1/2 functions tested, 1 test, 0 unlinked contracts"));
}

#[test]
fn spec_json_is_machine_readable() {
    let dir = project();
    let output = solspec(dir.path(), &["spec", "--format", "json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["summary"]["tested_functions"], 1);
    assert_eq!(value["report"]["contracts"]["Vault"]["functions"]["deposit"][0]["name"], "test_deposit");
}

#[test]
fn error_diagnostics_fail_the_run() {
    let dir = project();
    write(dir.path(), "test/Stray.sol", "contract Stray {}");

    let output = solspec(dir.path(), &["check"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(
        "error[SPEC-E001]: Stray.sol (0.8.22) was not identified as a test, setup or utility"
    ));
    assert!(stdout.contains("1 error, 0 warnings"));
}

#[test]
fn warnings_alone_succeed() {
    let dir = project();
    write(
        dir.path(),
        "test/Vault.Access.t.sol",
        "contract Access { function test_OnlyOwner() public {} }",
    );
    write(
        dir.path(),
        "test/Vault.t.sol",
        "contract VaultTest { function test_pause() public {} }",
    );

    let output = solspec(dir.path(), &["check"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0 errors, 1 warning"));
}

#[test]
fn files_command_uses_configured_test_dir() {
    let dir = project();
    write(dir.path(), "solspec.toml", "[paths]\ntest = \"spec\"\n");
    write(dir.path(), "spec/Vault.t.sol", "contract VaultTest {}");
    write(dir.path(), "spec/utils/VaultHelper.sol", "contract VaultHelper {}");

    let output = solspec(dir.path(), &["files"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Tests (1)\n  spec/Vault.t.sol (0.8.22)"));
    assert!(stdout.contains("Utilities (1)\n  spec/utils/VaultHelper.sol (0.8.22)"));
}

#[test]
fn missing_root_is_reported() {
    let dir = TempDir::new().unwrap();
    let output = solspec(&dir.path().join("absent"), &["check"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Root directory not found"));
}
