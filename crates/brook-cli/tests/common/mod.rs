//! Shared E2E test helpers for `brook` binary tests.

use assert_cmd::cargo::cargo_bin_cmd;
use std::time::Duration;

/// Default timeout for CLI tests.
pub const TIMEOUT_BASIC: Duration = Duration::from_secs(10);

/// Variables that would leak the developer's setup into a test run.
const AMBIENT_VARS: &[&str] = &[
    "RUST_LOG",
    "BROOK_LOSSY",
    "BROOK_BUFFER_SIZE",
    "BROOK_FLUSH_INTERVAL_MS",
    "BROOK_EVALUATOR",
    "BROOK_LOSSY_EVALUATOR",
    "BROOK_CAPTURE_FLAGS",
];

/// Build a Command for the `brook` binary isolated in a tempdir.
///
/// HOME and the project root both point at the tempdir, so no user or
/// repository config is picked up. Returns (command, _guard); keep the
/// guard alive for the test's duration.
pub fn brook_cmd() -> (assert_cmd::Command, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let mut cmd: assert_cmd::Command = cargo_bin_cmd!("brook");
    cmd.timeout(TIMEOUT_BASIC);
    for var in AMBIENT_VARS {
        cmd.env_remove(var);
    }
    cmd.env("HOME", tmp.path());
    cmd.args(["-C", tmp.path().to_str().expect("valid utf8")]);
    (cmd, tmp)
}

/// Writes `.brook/config.toml` under `root`.
pub fn write_project_config(root: &std::path::Path, toml: &str) {
    let dir = root.join(".brook");
    std::fs::create_dir_all(&dir).expect("create .brook");
    std::fs::write(dir.join("config.toml"), toml).expect("write config");
}
