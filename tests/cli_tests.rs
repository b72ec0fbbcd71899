#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use std::fs;
use tempfile::NamedTempFile;

const CLASSES: &str = "done\nPhysics\n45min\ngarbage line\ndone\nChemistry\n30min\n";

#[allow(deprecated)]
fn cli() -> Command {
    Command::cargo_bin("cli").expect("cli binary")
}

fn base_args(cmd: &mut Command) -> &mut Command {
    cmd.args([
        "--start-date",
        "2025-01-06",
        "--study-days",
        "1",
        "--start-time",
        "09:00",
        "--hours",
        "1",
        "--input",
        "-",
    ])
}

#[test]
fn cli_writes_calendar_to_stdout() {
    let mut cmd = cli();
    base_args(&mut cmd)
        .write_stdin(CLASSES)
        .assert()
        .success()
        .stdout(str_contains("BEGIN:VCALENDAR"))
        .stdout(str_contains("SUMMARY:Study Block 2025-01-06"))
        .stdout(str_contains("SUMMARY:Study Block 2025-01-13"))
        .stderr(str_contains("2 study days"));
}

#[test]
fn cli_writes_csv_to_output_file() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let mut cmd = cli();
    base_args(&mut cmd)
        .args(["--format", "csv", "--output"])
        .arg(tmp.path())
        .write_stdin(CLASSES)
        .assert()
        .success()
        .stderr(str_contains("Schedule written to"));

    let contents = fs::read_to_string(tmp.path()).unwrap();
    assert!(contents.starts_with("date,item_index,status,subject,duration_minutes"));
    assert!(contents.contains("2025-01-13,1,done,Chemistry,15"));
}

#[test]
fn cli_reads_request_file_and_lets_flags_override() {
    let request = NamedTempFile::new().expect("create temp file");
    let json = serde_json::json!({
        "start_date": "2025-01-06",
        "study_days": "1",
        "start_time": "09:00",
        "daily_study_limit_hours": "1",
        "multiplier": "1",
        "class_input": "todo\nMath\n30min"
    });
    fs::write(request.path(), json.to_string()).unwrap();

    cli()
        .arg("--request")
        .arg(request.path())
        .args(["--study-days", "2", "--format", "json"])
        .assert()
        .success()
        .stdout(str_contains("2025-01-07"))
        .stdout(str_contains("Math"));
}

#[test]
fn cli_reports_empty_weekday_list() {
    let mut cmd = cli();
    base_args(&mut cmd)
        .args(["--study-days", ""])
        .write_stdin(CLASSES)
        .assert()
        .failure()
        .stderr(str_contains("Cannot build a schedule"));
}

#[test]
fn cli_reports_invalid_field() {
    let mut cmd = cli();
    base_args(&mut cmd)
        .args(["--start-time", "nine"])
        .write_stdin(CLASSES)
        .assert()
        .failure()
        .stderr(str_contains("Invalid input: invalid start_time"));
}
