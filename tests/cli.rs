//! End-to-end checks of the installer binary.
//!
//! Only paths that cannot reach a real package manager or installer are
//! exercised here: argument errors and the offline branch without bundles.

mod common;

use common::TestContext;
use predicates::prelude::*;
use std::fs;

#[test]
fn unknown_platform_prints_usage_and_touches_nothing() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("macos")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported platform"))
        .stderr(predicate::str::contains("Usage"));

    assert!(!ctx.root().join("data").exists());
}

#[test]
fn missing_platform_fails() {
    let ctx = TestContext::new();

    ctx.cli()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("<PLATFORM>"));

    assert!(!ctx.config_file().exists());
}

#[test]
fn help_exits_cleanly() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TREEDOC_ROOT"));
}

#[test]
fn offline_branch_without_bundles_fails_but_seeds_config() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("windows")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("missing bundled artifact"))
        .stdout(predicate::str::contains("Installation failed"));

    let document: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(ctx.config_file()).expect("config written"))
            .expect("config is JSON");
    assert_eq!(document["settings"]["theme"], "default");
    assert_eq!(document["tree"][0]["text"], "Root");
}

#[test]
fn existing_config_survives_a_failed_run() {
    let ctx = TestContext::new();
    let original = "{\"tree\": [], \"settings\": {\"theme\": \"solarized\"}}\n";
    ctx.write_config(original);

    ctx.cli().arg("windows").assert().code(1);

    assert_eq!(
        fs::read_to_string(ctx.config_file()).expect("config readable"),
        original
    );
}
