// dropscrub/tests/cli_integration_tests.rs
//! CLI-level tests for the one-shot `filter` command and argument
//! handling. The long-running `watch` command is exercised at the
//! library level in dropscrub-core.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn dropscrub() -> Command {
    Command::cargo_bin("dropscrub").expect("binary builds")
}

#[test]
fn filter_redacts_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "Contact me at 555-123-4567 or a@b.com from 10.0.0.5").unwrap();

    dropscrub()
        .arg("--quiet")
        .arg("filter")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("<phone>"))
        .stdout(predicate::str::contains("<email>"))
        .stdout(predicate::str::contains("<ip>"))
        .stdout(predicate::str::contains("555-123-4567").not());
}

#[test]
fn filter_writes_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out.txt");
    fs::write(&input, "/home/alice/docs/f.txt").unwrap();

    dropscrub()
        .arg("--quiet")
        .arg("filter")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let body = fs::read_to_string(&output).unwrap();
    assert_eq!(body, "/home/<u>/docs/f.txt");
}

#[test]
fn filter_honors_a_user_rules_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.txt");
    fs::write(&input, "ticket TCK-4411 opened").unwrap();

    let rules = dir.path().join("rules.yaml");
    fs::write(
        &rules,
        r#"
rules:
  - name: ticket
    pattern: 'TCK-\d{4}'
    replace_with: "<ticket>"
"#,
    )
    .unwrap();

    dropscrub()
        .arg("--quiet")
        .arg("--rules")
        .arg(&rules)
        .arg("filter")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("<ticket>"));
}

#[test]
fn filter_fails_cleanly_on_missing_input() {
    dropscrub()
        .arg("--quiet")
        .arg("filter")
        .arg("no/such/file.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read input file"));
}

#[test]
fn help_lists_both_commands() {
    dropscrub()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("filter"));
}
