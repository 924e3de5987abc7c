//! Basic CLI E2E tests.
//!
//! Each test runs the compiled binary against its own scratch data
//! directory (via RITUAL_DATA_DIR), so tests are isolated and can run
//! in parallel.

use std::path::Path;
use std::process::Command;

/// Run a CLI command against the given data directory.
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_ritual"))
        .env("RITUAL_DATA_DIR", data_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command and expect success.
fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\nstderr: {stderr}");
    stdout
}

/// Pull the trailing pretty-JSON value out of mixed stdout.
fn trailing_json(stdout: &str) -> serde_json::Value {
    let start = stdout
        .find(['{', '['])
        .unwrap_or_else(|| panic!("no JSON in output: {stdout}"));
    serde_json::from_str(&stdout[start..]).expect("invalid JSON in output")
}

#[test]
fn habit_add_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["habit", "add", "Read", "--description", "20 pages"]);
    assert!(stdout.contains("Habit created:"));

    let stdout = run_cli_success(dir.path(), &["habit", "list"]);
    let habits = trailing_json(&stdout);
    let habits = habits.as_array().unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0]["name"], "Read");
    assert_eq!(habits[0]["status"], "active");
}

#[test]
fn habit_pause_hides_it_from_the_default_list() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Run"]);
    let stdout = run_cli_success(dir.path(), &["habit", "list"]);
    let id = trailing_json(&stdout)[0]["id"].as_i64().unwrap().to_string();

    run_cli_success(dir.path(), &["habit", "pause", &id]);
    let stdout = run_cli_success(dir.path(), &["habit", "list"]);
    assert!(trailing_json(&stdout).as_array().unwrap().is_empty());

    let stdout = run_cli_success(dir.path(), &["habit", "list", "--all"]);
    assert_eq!(trailing_json(&stdout).as_array().unwrap().len(), 1);
}

#[test]
fn checkin_record_awards_points() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Meditate"]);
    let stdout = run_cli_success(dir.path(), &["habit", "list"]);
    let id = trailing_json(&stdout)[0]["id"].as_i64().unwrap().to_string();

    let stdout = run_cli_success(dir.path(), &["checkin", "record", &id]);
    let receipt = trailing_json(&stdout);
    assert_eq!(receipt["streak"], 1);
    assert_eq!(receipt["points_delta"], 10);
    assert_eq!(receipt["balance"], 10);

    // Same day again must fail.
    let (_, stderr, code) = run_cli(dir.path(), &["checkin", "record", &id]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn checkin_list_and_calendar() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Write"]);
    let stdout = run_cli_success(dir.path(), &["habit", "list"]);
    let id = trailing_json(&stdout)[0]["id"].as_i64().unwrap().to_string();
    run_cli_success(dir.path(), &["checkin", "record", &id, "--note", "morning pages"]);

    let stdout = run_cli_success(dir.path(), &["checkin", "list"]);
    let checkins = trailing_json(&stdout);
    assert_eq!(checkins.as_array().unwrap().len(), 1);
    assert_eq!(checkins[0]["note"], "morning pages");

    let stdout = run_cli_success(dir.path(), &["checkin", "calendar", &id]);
    let calendar = trailing_json(&stdout);
    assert_eq!(calendar["days"].as_object().unwrap().len(), 1);
}

#[test]
fn makeup_without_points_fails() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Stretch"]);
    let stdout = run_cli_success(dir.path(), &["habit", "list"]);
    let id = trailing_json(&stdout)[0]["id"].as_i64().unwrap().to_string();

    // Fresh account: balance 0, makeup costs 20.
    let (_, stderr, code) = run_cli(dir.path(), &["checkin", "makeup", &id]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn points_summary_rewards_and_failed_exchange() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["habit", "add", "Read"]);
    let stdout = run_cli_success(dir.path(), &["habit", "list"]);
    let id = trailing_json(&stdout)[0]["id"].as_i64().unwrap().to_string();
    run_cli_success(dir.path(), &["checkin", "record", &id]);

    let stdout = run_cli_success(dir.path(), &["points", "summary"]);
    let summary = trailing_json(&stdout);
    assert_eq!(summary["total_points"], 10);
    assert_eq!(summary["earned_today"], 10);

    let stdout = run_cli_success(dir.path(), &["points", "rewards"]);
    assert_eq!(trailing_json(&stdout).as_array().unwrap().len(), 7);

    let stdout = run_cli_success(dir.path(), &["points", "history"]);
    let history = trailing_json(&stdout);
    assert_eq!(history[0]["reason"], "daily_checkin");

    // 10 points cannot buy a 100-point badge.
    let (_, stderr, code) = run_cli(dir.path(), &["points", "exchange", "badge_bronze"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn stats_commands_run_on_a_fresh_account() {
    let dir = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(dir.path(), &["stats", "overview"]);
    let overview = trailing_json(&stdout);
    assert_eq!(overview["total_habits"], 0);
    assert_eq!(overview["total_points"], 0);

    let stdout = run_cli_success(dir.path(), &["stats", "habits"]);
    assert!(trailing_json(&stdout).as_array().unwrap().is_empty());

    let stdout = run_cli_success(dir.path(), &["stats", "daily", "--days", "3"]);
    assert_eq!(trailing_json(&stdout).as_array().unwrap().len(), 3);
}

#[test]
fn config_set_and_show() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["config", "set-user", "tester"]);
    run_cli_success(dir.path(), &["config", "set-offset", "9"]);

    let stdout = run_cli_success(dir.path(), &["config", "show"]);
    let config = trailing_json(&stdout);
    assert_eq!(config["default_user"], "tester");
    assert_eq!(config["timezone_offset_hours"], 9);

    run_cli_success(dir.path(), &["config", "reset"]);
    let stdout = run_cli_success(dir.path(), &["config", "show"]);
    assert_eq!(trailing_json(&stdout)["default_user"], "local");
}
