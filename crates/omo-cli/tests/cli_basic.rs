//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a temporary data directory and
//! verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str], stdin: Option<&str>) -> (String, String, i32) {
    run_cli_bytes(data_dir, args, stdin.map(str::as_bytes))
}

/// Like `run_cli`, with raw stdin bytes.
fn run_cli_bytes(data_dir: &Path, args: &[&str], stdin: Option<&[u8]>) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_omo-cli"))
        .arg("--data-dir")
        .arg(data_dir)
        .args(args)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        if let Some(input) = stdin {
            pipe.write_all(input).expect("write stdin");
        }
    }

    let output = child.wait_with_output().expect("CLI did not exit");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn event_types(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(|line| {
            let event: serde_json::Value =
                serde_json::from_str(line).expect("each line is a JSON event");
            event["type"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

fn capacity_report(data_dir: &Path) -> serde_json::Value {
    let (stdout, _, code) = run_cli(data_dir, &["capacity", "show"], None);
    assert_eq!(code, 0, "capacity show failed");
    serde_json::from_str(&stdout).expect("capacity show prints JSON")
}

#[test]
fn test_capacity_show_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let report = capacity_report(dir.path());
    assert_eq!(report["recorded_accidents"], 0);
    assert_eq!(report["capacity_ml"], 500.0);
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "model.half_life_min"], None);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "45.0");

    let (stdout, _, code) = run_cli(
        dir.path(),
        &["config", "set", "drink.default_ml", "250"],
        None,
    );
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "ok");

    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "drink.default_ml"], None);
    assert_eq!(stdout.trim(), "250");
}

#[test]
fn test_config_rejects_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "model.nope", "1"], None);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"), "stderr was: {stderr}");
}

#[test]
fn test_track_session_logs_accident() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        dir.path(),
        &["track", "--seed", "7"],
        Some("drink 500\nstatus\naccident\nquit\n"),
    );
    assert_eq!(code, 0);
    assert_eq!(
        event_types(&stdout),
        vec!["DrinkLogged", "Snapshot", "Voided", "SessionSaved"]
    );

    let report = capacity_report(dir.path());
    assert_eq!(report["recorded_accidents"], 1);
}

#[test]
fn test_track_rejects_pee_without_permission() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(dir.path(), &["track"], Some("pee\n"));
    assert_eq!(code, 0);
    assert!(stderr.contains("permission has not been granted"), "stderr was: {stderr}");
    assert_eq!(event_types(&stdout), vec!["SessionSaved"]);
}

#[test]
fn test_capacity_reset_clears_log() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("accidents.csv"), "400\n600\n").unwrap();
    assert_eq!(capacity_report(dir.path())["capacity_ml"], 500.0);
    assert_eq!(capacity_report(dir.path())["recorded_accidents"], 2);

    let (_, _, code) = run_cli(dir.path(), &["capacity", "reset"], None);
    assert_eq!(code, 0);
    assert_eq!(capacity_report(dir.path())["recorded_accidents"], 0);
}

#[test]
fn test_track_saves_accidents_when_stdin_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli_bytes(
        dir.path(),
        &["track"],
        Some(&b"drink 500\naccident\n\xff\nquit\n"[..]),
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"), "stderr was: {stderr}");
    assert_eq!(event_types(&stdout), vec!["DrinkLogged", "Voided"]);

    assert!(dir.path().join("accidents.csv").exists());
    assert_eq!(capacity_report(dir.path())["recorded_accidents"], 1);
}

#[test]
fn test_track_rejects_oversized_hold_goal() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["track", "--hold-goal", "400000000000000000"],
        Some("quit\n"),
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("countdown duration"), "stderr was: {stderr}");
    assert!(!stderr.contains("panicked"), "stderr was: {stderr}");
}

#[test]
fn test_track_rejects_oversized_watch() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["track"],
        Some("watch 99999999999\nquit\n"),
    );
    assert_eq!(code, 0);
    assert!(stderr.contains("invalid duration"), "stderr was: {stderr}");
    assert_eq!(event_types(&stdout), vec!["SessionSaved"]);
}

#[test]
fn test_track_reset_forgets_prior_accidents() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("accidents.csv"), "200\n").unwrap();
    assert_eq!(capacity_report(dir.path())["capacity_ml"], 200.0);

    let (stdout, _, code) = run_cli(dir.path(), &["track"], Some("reset\nquit\n"));
    assert_eq!(code, 0);
    let events: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "CapacityReset");
    assert_eq!(events[0]["capacity_ml"], 500.0);
    assert_eq!(events[1]["type"], "SessionSaved");

    assert!(!dir.path().join("accidents.csv").exists());
    assert_eq!(capacity_report(dir.path())["recorded_accidents"], 0);
}
