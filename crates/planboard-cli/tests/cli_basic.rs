//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Each test gets
//! its own data directory through PLANBOARD_DATA_DIR.

use std::path::Path;
use std::process::Command;

/// Run a CLI command against `data_dir` and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "planboard-cli", "--"])
        .args(args)
        .env("PLANBOARD_DATA_DIR", data_dir)
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

fn ids(list: &serde_json::Value) -> Vec<String> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect()
}

fn create_daily_series(dir: &Path) -> String {
    let created = run_json(
        dir,
        &[
            "activity", "create", "--name", "Ward round", "--start", "2024-01-01",
            "--board", "RAPHA-LIFELINE", "--frequency", "daily", "--interval", "2",
            "--until", "2024-01-07",
        ],
    );
    assert_eq!(created["kind"], "created");
    created["activity"]["id"].as_str().unwrap().to_string()
}

#[test]
fn test_activity_create_and_list_expands_series() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_daily_series(dir.path());

    let list = run_json(dir.path(), &["activity", "list", "--horizon", "2024-12-31"]);
    assert_eq!(
        ids(&list),
        [
            format!("{id}-20240101"),
            format!("{id}-20240103"),
            format!("{id}-20240105"),
            format!("{id}-20240107"),
        ]
    );
    assert_eq!(list[0]["parentId"], id.as_str());
}

#[test]
fn test_activity_delete_single_and_future() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_daily_series(dir.path());
    let horizon = ["--horizon", "2024-12-31"];

    let instance = format!("{id}-20240103");
    let deleted = run_json(dir.path(), &["activity", "delete", instance.as_str(), horizon[0], horizon[1]]);
    assert_eq!(deleted["kind"], "skipped");
    assert_eq!(deleted["template"]["skippedDates"][0], "2024-01-03");

    let instance = format!("{id}-20240105");
    let deleted = run_json(
        dir.path(),
        &["activity", "delete", instance.as_str(), "--scope", "future", horizon[0], horizon[1]],
    );
    assert_eq!(deleted["template"]["recurrence"]["endRecurrence"], "2024-01-04");

    let list = run_json(dir.path(), &["activity", "list", horizon[0], horizon[1]]);
    assert_eq!(ids(&list), [format!("{id}-20240101")]);
}

#[test]
fn test_activity_edit_single_detaches() {
    let dir = tempfile::tempdir().unwrap();
    let id = create_daily_series(dir.path());

    let instance = format!("{id}-20240105");
    let edited = run_json(
        dir.path(),
        &[
            "activity", "edit", instance.as_str(), "--name", "X", "--scope", "single",
            "--horizon", "2024-12-31",
        ],
    );
    assert_eq!(edited["kind"], "detached");
    assert_eq!(edited["detached"]["activityName"], "X");
    assert_eq!(edited["detached"]["startDate"], "2024-01-05");
    assert!(edited["detached"].get("parentId").is_none());
    assert!(edited["detached"].get("recurrence").is_none());

    let list = run_json(
        dir.path(),
        &["activity", "list", "--from", "2024-01-05", "--to", "2024-01-05", "--horizon", "2024-12-31"],
    );
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["activityName"], "X");
}

#[test]
fn test_activity_get_missing_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["activity", "get", "nope"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Activity not found: nope"));
}

#[test]
fn test_activity_create_rejects_bad_dates() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["activity", "create", "--name", "Broken", "--start", "2024-02-30"],
    );
    assert_eq!(code, 1);
    assert!(stderr.contains("expected YYYY-MM-DD"));
}

#[test]
fn test_import_template_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let (template, _, code) = run_cli(dir.path(), &["import", "--template"]);
    assert_eq!(code, 0);
    assert!(template.starts_with("Activity Name,Start Date,End Date,Board,Status"));

    let csv = dir.path().join("activities.csv");
    std::fs::write(
        &csv,
        format!("{template}AGM,2024-12-05,2024-12-05,SECRETARIAT,HOUSE\n"),
    )
    .unwrap();

    let imported = run_json(dir.path(), &["import", csv.to_str().unwrap()]);
    assert_eq!(imported["imported"], 2);
    assert_eq!(imported["activities"][1]["status"], "STATUTORY");
    assert_eq!(imported["activities"][1]["isLocked"], true);
}

#[test]
fn test_import_reports_bad_row() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("bad.csv");
    std::fs::write(
        &csv,
        "Activity Name,Start Date,End Date,Board,Status\nQuiz,2024-03-01,2024-03-01,CHESS,HOUSE\n",
    )
    .unwrap();

    let (_, stderr, code) = run_cli(dir.path(), &["import", csv.to_str().unwrap()]);
    assert_eq!(code, 1);
    assert!(stderr.contains("Row 2: Invalid Board \"CHESS\"."));

    let list = run_json(dir.path(), &["activity", "list"]);
    assert!(list.as_array().unwrap().is_empty());
}

#[test]
fn test_boards_lists_labels_and_colours() {
    let dir = tempfile::tempdir().unwrap();
    let boards = run_json(dir.path(), &["boards"]);
    let boards = boards.as_array().unwrap();
    assert_eq!(boards.len(), 9);
    assert_eq!(boards[0]["board"], "RAPHATORIA");
    assert_eq!(boards[0]["color"], "#3B82F6");
    assert_eq!(boards[8]["board"], "SECRETARIAT");
}

#[test]
fn test_config_get_set() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "planner.default_board"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "RAPHATORIA");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "planner.default_board", "EXCEL"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "planner.default_board"]);
    assert_eq!(stdout.trim(), "EXCEL");

    let (_, _, code) = run_cli(dir.path(), &["config", "get", "planner.nope"]);
    assert_eq!(code, 1);
}

#[test]
fn test_report_prompt_only() {
    let dir = tempfile::tempdir().unwrap();
    run_json(
        dir.path(),
        &[
            "activity", "create", "--name", "Outreach", "--start", "2024-03-20", "--end",
            "2024-03-22", "--board", "WHOLENESS MISSIONS",
        ],
    );

    let (stdout, stderr, code) = run_cli(
        dir.path(),
        &["report", "--month", "2024-03", "--prompt-only"],
    );
    assert_eq!(code, 0, "{stderr}");
    assert!(stdout.contains("ACTIVITIES FOR THE MONTH OF MARCH 2024"));
    assert!(stdout.contains("\"activityName\":\"Outreach\""));
}
