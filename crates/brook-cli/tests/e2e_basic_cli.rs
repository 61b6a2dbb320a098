//! E2E tests: stdin replay through the `brook` binary.

mod common;

use common::{brook_cmd, write_project_config};
use predicates::prelude::*;

const INPUT: &str = "\
DEBUG app one
INFO app two
DEBUG app three
WARN app four
";

// ── Help ────────────────────────────────────────────────────────────

#[test]
fn help_lists_options() {
    let (mut cmd, _guard) = brook_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--buffer-size"))
        .stdout(predicate::str::contains("--lossy"));
}

// ── Non-lossy ───────────────────────────────────────────────────────

#[test]
fn non_lossy_forwards_every_line() {
    let (mut cmd, _guard) = brook_cmd();
    cmd.write_stdin(INPUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("app - one"))
        .stdout(predicate::str::contains("app - two"))
        .stdout(predicate::str::contains("app - three"))
        .stdout(predicate::str::contains("WARN "))
        .stderr(predicate::str::contains("4 appended, 4 forwarded, 0 discarded"));
}

#[test]
fn output_preserves_input_order() {
    let (mut cmd, _guard) = brook_cmd();
    let output = cmd.args(["--buffer-size", "2"]).write_stdin(INPUT).output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let messages: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split(" app - ").nth(1))
        .map(|rest| rest.split(" (").next().unwrap_or(rest))
        .collect();
    assert_eq!(messages, vec!["one", "two", "three", "four"]);
}

// ── Lossy ───────────────────────────────────────────────────────────

#[test]
fn lossy_drops_events_evicted_before_trigger() {
    let (mut cmd, _guard) = brook_cmd();
    cmd.args(["--lossy", "--buffer-size", "2", "--evaluator", "adaptive"])
        .write_stdin(INPUT)
        .assert()
        .success()
        .stdout(predicate::str::contains("app - one").not())
        .stdout(predicate::str::contains("app - two").not())
        .stdout(predicate::str::contains("app - three"))
        .stdout(predicate::str::contains("app - four"))
        .stderr(predicate::str::contains("2 forwarded, 2 discarded"));
}

#[test]
fn lossy_close_without_secondary_discards_remainder() {
    let (mut cmd, _guard) = brook_cmd();
    cmd.args(["--lossy", "--evaluator", "never"])
        .write_stdin("INFO app quiet\n")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("0 forwarded, 1 discarded"));
}

// ── Input handling ──────────────────────────────────────────────────

#[test]
fn malformed_lines_are_skipped() {
    let (mut cmd, _guard) = brook_cmd();
    cmd.write_stdin("# comment\nLOUD app nope\nINFO app fine\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("app - fine"))
        .stdout(predicate::str::contains("nope").not())
        .stderr(predicate::str::contains("skipping malformed line"))
        .stderr(predicate::str::contains("3 line(s), 1 skipped"));
}

#[test]
fn zero_buffer_size_fails() {
    let (mut cmd, _guard) = brook_cmd();
    cmd.args(["--buffer-size", "0"])
        .write_stdin(INPUT)
        .assert()
        .failure()
        .stderr(predicate::str::contains("buffer_size must be positive"));
}

#[test]
fn unknown_evaluator_spec_fails_parse() {
    let (mut cmd, _guard) = brook_cmd();
    cmd.args(["--evaluator", "level_threshold:loud"])
        .assert()
        .failure();
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn project_config_routes_to_jsonl_file() {
    let (mut cmd, guard) = brook_cmd();
    let out = guard.path().join("events.jsonl");
    write_project_config(
        guard.path(),
        &format!(
            "[dispatcher]\nbuffer_size = 3\n\n[[sinks]]\nkind = \"jsonl\"\npath = {:?}\n",
            out.to_str().unwrap()
        ),
    );

    cmd.write_stdin(INPUT)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let content = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3]["message"], "four");
    assert_eq!(lines[3]["logger_name"], "app");
}

#[test]
fn env_overrides_project_config() {
    let (mut cmd, guard) = brook_cmd();
    write_project_config(guard.path(), "[dispatcher]\nlossy = true\nevaluator = \"never\"\n");

    cmd.env("BROOK_LOSSY", "false")
        .write_stdin(INPUT)
        .assert()
        .success()
        .stderr(predicate::str::contains("4 forwarded, 0 discarded"));
}

#[test]
fn no_lossy_flag_overrides_config() {
    let (mut cmd, guard) = brook_cmd();
    write_project_config(guard.path(), "[dispatcher]\nlossy = true\nevaluator = \"never\"\n");

    cmd.arg("--no-lossy")
        .write_stdin(INPUT)
        .assert()
        .success()
        .stderr(predicate::str::contains("4 forwarded, 0 discarded"));
}

#[test]
fn print_config_shows_resolved_layers() {
    let (mut cmd, guard) = brook_cmd();
    write_project_config(guard.path(), "[dispatcher]\nbuffer_size = 32\nlossy = true\n");

    cmd.args(["--buffer-size", "7", "--print-config"])
        .assert()
        .success()
        .stdout(predicate::str::contains("buffer_size = 7"))
        .stdout(predicate::str::contains("lossy = true"))
        .stdout(predicate::str::contains("kind = \"console\""));
}
