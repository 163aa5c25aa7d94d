//! Behavior of the `deepgrep` binary.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn deepgrep() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("deepgrep"))
}

#[test]
fn prints_matches_from_stdin() {
    deepgrep()
        .arg("^\\d+$")
        .write_stdin("123\nabc\n456\n")
        .assert()
        .success()
        .stdout("<stdin>:1:123\n<stdin>:3:456\n");
}

#[test]
fn exits_one_when_nothing_matches() {
    deepgrep()
        .arg("xyz")
        .write_stdin("abc\n")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}

#[test]
fn syntax_error_exits_two_with_position() {
    deepgrep()
        .arg("(abc")
        .write_stdin("abc\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("position 0"));
}

#[test]
fn reads_files_and_prefixes_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.txt");
    std::fs::write(&path, "hello hello\nhello world\n").unwrap();
    deepgrep()
        .arg("(\\w+)\\s+\\1")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("input.txt:1:hello hello"))
        .stdout(predicate::str::contains("hello world").not());
}

#[test]
fn missing_file_is_an_error() {
    deepgrep()
        .args(["a", "does/not/exist.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to read"));
}

#[test]
fn count_prints_totals() {
    deepgrep()
        .args(["--count", "\\d+"])
        .write_stdin("Found 42 items and 17 users\n")
        .assert()
        .success()
        .stdout("<stdin>:2\n");
}

#[test]
fn groups_are_listed_after_match() {
    deepgrep()
        .args(["--groups", "(\\w+)=(\\d+)?"])
        .write_stdin("a=1 b=\n")
        .assert()
        .success()
        .stdout("<stdin>:1:a=1\nGROUP 1:a\nGROUP 2:1\n<stdin>:1:b=\nGROUP 1:b\nGROUP 2:\n");
}

#[test]
fn json_output_has_offsets_and_groups() {
    let output = deepgrep()
        .args(["--json", "--line-offsets", "b(c)"])
        .write_stdin("xx\nabc\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let line = String::from_utf8(output.stdout).unwrap();
    let value: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(value["path"], "<stdin>");
    assert_eq!(value["start"], 1);
    assert_eq!(value["end"], 3);
    assert_eq!(value["line"], 1);
    assert_eq!(value["text"], "bc");
    assert_eq!(value["groups"][1]["text"], "c");
}

#[test]
fn abort_on_budget_reports_resource_exhaustion() {
    let input = format!("{}\n", "a".repeat(30));
    deepgrep()
        .args(["--step-budget", "1000", "--abort-on-budget", "(a*)*b"])
        .write_stdin(input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("step budget of 1000 exhausted"));
}

#[test]
fn budget_exhaustion_is_skipped_by_default() {
    let input = format!("{}\nb\n", "a".repeat(30));
    deepgrep()
        .args(["--step-budget", "1000", "(a*)*b"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("<stdin>:2:b"));
}

#[test]
fn config_file_is_validated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deepgrep.toml");
    std::fs::write(&path, "step_budget = 0\n").unwrap();
    deepgrep()
        .arg("--config")
        .arg(&path)
        .arg("a")
        .write_stdin("a\n")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("step_budget must be greater than zero"));
}
