//! Basic CLI E2E tests.
//!
//! Tests invoke the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_fittimer"))
        .args(args)
        .env("FITTIMER_DATA_DIR", data_dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\n{stderr}");
    serde_json::from_str(&stdout).expect("Failed to parse JSON output")
}

fn add_exercise(data_dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["plan", "add"];
    full.extend_from_slice(args);
    let planned = run_json(data_dir, &full);
    planned["id"].as_str().unwrap().to_string()
}

#[test]
fn test_plan_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    add_exercise(dir.path(), &["Squat", "--sets", "4", "--reps", "10", "--rest", "45"]);
    add_exercise(dir.path(), &["Plank", "--duration", "60"]);

    let plan = run_json(dir.path(), &["plan", "list", "--json"]);
    let plan = plan.as_array().unwrap();
    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0]["name"], "Squat");
    assert_eq!(plan[0]["sets"], 4);
    assert_eq!(plan[1]["duration_seconds"], 60);
    // Defaults from config.
    assert_eq!(plan[1]["sets"], 3);
    assert_eq!(plan[1]["rest_seconds"], 60);

    let (stdout, _, code) = run_cli(dir.path(), &["plan", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("1. Squat  4 x 10 reps  rest 45s"));
}

#[test]
fn test_plan_remove_unknown_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["plan", "remove", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_timer_step_by_step() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_exercise(dir.path(), &["Row", "--sets", "2", "--duration", "5", "--rest", "3"]);

    let started = run_json(dir.path(), &["timer", "start", &id]);
    assert_eq!(started["snapshot"]["phase"], "work");
    assert_eq!(started["snapshot"]["seconds_remaining"], 5);

    let ticked = run_json(dir.path(), &["timer", "tick", "--count", "5"]);
    assert_eq!(ticked["snapshot"]["phase"], "rest");
    assert_eq!(ticked["snapshot"]["current_set"], 1);
    let events = ticked["events"].as_array().unwrap();
    assert!(events.iter().any(|e| e["type"] == "phase_changed"));

    // Skipping to rest while resting is rejected.
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "skip-rest"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("rest phase"));

    let next = run_json(dir.path(), &["timer", "next-set"]);
    assert_eq!(next["snapshot"]["current_set"], 2);
    assert_eq!(next["snapshot"]["phase"], "work");

    // Last set: no next set to skip to, and no rest after it.
    let (_, _, code) = run_cli(dir.path(), &["timer", "skip-rest"]);
    assert_eq!(code, 1);

    let paused = run_json(dir.path(), &["timer", "pause"]);
    assert_eq!(paused["snapshot"]["running"], false);
    let still = run_json(dir.path(), &["timer", "tick"]);
    assert_eq!(still["snapshot"]["seconds_remaining"], 5);
    run_json(dir.path(), &["timer", "resume"]);

    let done = run_json(dir.path(), &["timer", "tick", "--count", "10"]);
    assert_eq!(done["snapshot"]["completed"], true);
    let events = done["events"].as_array().unwrap();
    assert_eq!(
        events.iter().filter(|e| e["type"] == "run_completed").count(),
        1
    );

    let history = run_json(dir.path(), &["history", "--json"]);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["exercise_name"], "Row");
    assert_eq!(history[0]["sets_performed"], 2);
}

#[test]
fn test_timer_complete_records_forced_run() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_exercise(dir.path(), &["Curl", "--sets", "5", "--reps", "8"]);
    run_json(dir.path(), &["timer", "start", &id]);
    run_json(dir.path(), &["timer", "tick", "--count", "3"]);

    let done = run_json(dir.path(), &["timer", "complete"]);
    assert_eq!(done["snapshot"]["completed"], true);
    assert_eq!(done["events"][0]["forced"], true);

    // A second complete is a no-op.
    let again = run_json(dir.path(), &["timer", "complete"]);
    assert!(again["events"].as_array().unwrap().is_empty());

    let history = run_json(dir.path(), &["history", "--json"]);
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["sets_performed"], 0);
}

#[test]
fn test_timer_finishes_after_exercise_removed() {
    let dir = tempfile::tempdir().unwrap();
    let id = add_exercise(dir.path(), &["Row", "--sets", "1", "--duration", "2"]);
    run_json(dir.path(), &["timer", "start", &id]);
    let (_, _, code) = run_cli(dir.path(), &["plan", "remove", &id]);
    assert_eq!(code, 0);

    let (stdout, stderr, code) = run_cli(dir.path(), &["timer", "tick", "--count", "5"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stderr.contains("failed to record finished run"));
    let done: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(done["snapshot"]["completed"], true);

    let status = run_json(dir.path(), &["timer", "status"]);
    assert_eq!(status["snapshot"]["completed"], true);
    assert_eq!(status["snapshot"]["seconds_remaining"], 0);

    let again = run_json(dir.path(), &["timer", "complete"]);
    assert!(again["events"].as_array().unwrap().is_empty());

    let history = run_json(dir.path(), &["history", "--json"]);
    assert!(history.as_array().unwrap().is_empty());
}

#[test]
fn test_timer_without_start_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["timer", "tick"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("no active timer"));
}

#[test]
fn test_run_whole_plan() {
    let dir = tempfile::tempdir().unwrap();
    run_cli(dir.path(), &["config", "set", "notifications.bell", "false"]);
    add_exercise(dir.path(), &["Squat", "--sets", "2", "--duration", "2", "--rest", "1"]);
    add_exercise(dir.path(), &["Plank", "--sets", "1", "--duration", "3"]);

    let (stdout, stderr, code) = run_cli(dir.path(), &["run", "--tick-ms", "5"]);
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("== Squat (1/2)"));
    assert!(stdout.contains("== Plank (2/2)"));
    assert!(stdout.contains("workout complete"));

    let history = run_json(dir.path(), &["history", "--json"]);
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[test]
fn test_run_empty_plan_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["run", "--tick-ms", "5"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("workout plan"));
}

#[test]
fn test_run_from_zero_rejected() {
    let dir = tempfile::tempdir().unwrap();
    add_exercise(dir.path(), &["Squat", "--sets", "1", "--duration", "1"]);
    let (stdout, stderr, code) = run_cli(dir.path(), &["run", "--from", "0", "--tick-ms", "5"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("--from"));
    assert!(!stdout.contains("== Squat"));
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timing.default_rest_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "60");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timing.default_rest_secs", "90"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "timing.default_rest_secs"]);
    assert_eq!(stdout.trim(), "90");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timing.nope", "1"]);
    assert_eq!(code, 1);
}
