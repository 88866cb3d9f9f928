//! End-to-end runs over a directory of task files, through the CLI binary

#![cfg(unix)]

use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Workspace where every `NNN.txt` task "prints" its content through `cat`.
fn workspace(outputs: &[&str], answers: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for (i, output) in outputs.iter().enumerate() {
        std::fs::write(temp_dir.path().join(format!("{:03}.txt", i + 1)), output).unwrap();
    }
    std::fs::write(temp_dir.path().join("answers.txt"), answers).unwrap();
    std::fs::write(
        temp_dir.path().join("verdict.toml"),
        r#"
[discovery]
extension = "txt"
exclude = ["answers.txt"]

[executor]
program = "cat"
args = []

[output]
color = false
"#,
    )
    .unwrap();
    temp_dir
}

fn verdict(workspace: &Path, args: &[&str]) -> std::process::Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_verdict"));
    command
        .arg("--workspace")
        .arg(workspace)
        .args(args)
        .env("XDG_CONFIG_HOME", workspace.join(".no-user-config"));
    // Other tests in this binary set VERDICT_* variables on the shared environment.
    for (name, _) in std::env::vars().filter(|(name, _)| name.starts_with("VERDICT")) {
        command.env_remove(name);
    }
    command.output().unwrap()
}

#[test]
fn run_prints_ordered_report() {
    let ws = workspace(&["42\n", "7\n", "7\n"], "42\n7\n8\n");
    let output = verdict(ws.path(), &["run", "--workers", "3"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "Problem 001: Output is correct '42 == 42'");
    assert_eq!(lines[1], "Problem 002: Output is correct '7 == 7'");
    assert_eq!(lines[2], "Problem 003: Output is incorrect '7 != 8'");
    assert!(lines[3].starts_with("Completed in: "));
    assert!(output.stderr.is_empty());
}

#[test]
fn strict_run_exits_with_mismatch_code() {
    let ws = workspace(&["1\n", "3\n"], "1\n2\n");
    let output = verdict(ws.path(), &["run", "--strict"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn json_report_is_machine_readable() {
    let ws = workspace(&["1\n", "2\n"], "1\n2\n");
    let output = verdict(ws.path(), &["run", "--format", "json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["passed"], 2);
    assert_eq!(value["failed"], 0);
    assert_eq!(value["lines"].as_array().unwrap().len(), 2);
}

#[test]
fn missing_answers_fails_without_report() {
    let ws = workspace(&["1\n"], "1\n");
    std::fs::remove_file(ws.path().join("answers.txt")).unwrap();

    let output = verdict(ws.path(), &["run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("answers.txt"));
}

#[test]
fn task_failure_fails_without_report() {
    let ws = workspace(&["1\n", "2\n"], "1\n2\n");
    std::fs::write(
        ws.path().join("verdict.toml"),
        r#"
[discovery]
extension = "txt"
exclude = ["answers.txt"]

[executor]
program = "cat"
args = ["--definitely-not-a-flag"]
"#,
    )
    .unwrap();

    let output = verdict(ws.path(), &["run"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to execute"));
}

#[test]
fn list_does_not_execute_tasks() {
    let ws = workspace(&["1\n", "2\n"], "");
    let output = verdict(ws.path(), &["list", "--format", "json"]);

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["count"], 2);
    assert_eq!(value["tasks"][1]["reference"], "002.txt");
}

#[test]
fn answers_flag_overrides_configured_path() {
    let ws = workspace(&["5\n"], "wrong\n");
    std::fs::write(ws.path().join("other.txt.answers"), "5\n").unwrap();

    let output = verdict(ws.path(), &["run", "--answers", "other.txt.answers"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Problem 001: Output is correct '5 == 5'"));
}
