//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get an owl command
pub fn owl() -> Command {
    Command::new(cargo::cargo_bin!("owl"))
}

/// Helper to create a test project in a temp directory
pub fn setup_test_project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    owl().current_dir(tmp.path()).arg("init").assert().success();
    tmp
}

/// Helper to create a test material, returning its full id
pub fn create_test_material(tmp: &TempDir, name: &str, unit: &str, price: f64) -> String {
    let output = owl()
        .current_dir(tmp.path())
        .args([
            "mat",
            "new",
            "--name",
            name,
            "--unit",
            unit,
            "--price",
            &price.to_string(),
            "--no-edit",
            "-o",
            "id",
        ])
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a test labor category, returning its full id
pub fn create_test_labor(tmp: &TempDir, name: &str, rate: f64) -> String {
    let output = owl()
        .current_dir(tmp.path())
        .args([
            "lab",
            "new",
            "--name",
            name,
            "--rate",
            &rate.to_string(),
            "--no-edit",
            "-o",
            "id",
        ])
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a test work, returning its full id
pub fn create_test_work(tmp: &TempDir, name: &str, unit: &str) -> String {
    let output = owl()
        .current_dir(tmp.path())
        .args([
            "work", "new", "--name", name, "--unit", unit, "--no-edit", "-o", "id",
        ])
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Helper to create a test work with a margin and components, returning its full id
pub fn create_test_work_with(
    tmp: &TempDir,
    name: &str,
    margin: Option<f64>,
    components: &[(&str, f64)],
) -> String {
    let mut args: Vec<String> = vec![
        "work".into(),
        "new".into(),
        "--name".into(),
        name.into(),
        "--no-edit".into(),
        "-o".into(),
        "id".into(),
    ];
    if let Some(margin) = margin {
        args.push("--margin".into());
        args.push(margin.to_string());
    }
    for (id, qty) in components {
        args.push("--component".into());
        args.push(format!("{}:{}", id, qty));
    }

    let output = owl()
        .current_dir(tmp.path())
        .args(&args)
        .output()
        .unwrap();

    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
