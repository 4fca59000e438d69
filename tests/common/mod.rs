//! Shared test helpers for integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a tea command that ignores any local or user configuration
pub fn tea() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("tea"));
    cmd.env_remove("RUST_LOG").env_remove("TEA_CONFIG");
    cmd
}

/// Helper to get a tea command running in an empty temporary directory
pub fn tea_in(tmp: &TempDir) -> Command {
    let mut cmd = tea();
    cmd.current_dir(tmp.path());
    cmd
}

/// Write a parameter file into the temp directory and return its path
pub fn write_params(tmp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = tmp.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// A parameter file extending Ecker2015 with a thinner separator
pub fn thin_separator(tmp: &TempDir) -> PathBuf {
    write_params(
        tmp,
        "thin.yaml",
        "title: Thin separator\nbase: Ecker2015\nparameters:\n  \"Separator thickness [m]\": 1.2e-5\n",
    )
}

/// Run a command that must succeed and parse its stdout as JSON
pub fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
