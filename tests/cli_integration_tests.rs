//! CLI Integration Tests
//!
//! Tests the CLI binaries directly using assert_cmd. Nothing here needs a
//! running backend: every command used reads local files only.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn registry() -> Command {
    let mut cmd = Command::cargo_bin("registry").unwrap();
    // keep the config lookup away from the developer's environment
    cmd.env_remove("REGISTRY_CONFIG")
        .env("REGISTRY_BASE_URL", "http://127.0.0.1:1");
    cmd
}

fn write_upload(dir: &TempDir, ttl: &str) -> std::path::PathBuf {
    let path = dir.path().join("upload.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "NAMA").unwrap();
    sheet.write_string(0, 1, "NIK").unwrap();
    sheet.write_string(0, 2, "TTL").unwrap();
    sheet.write_string(1, 0, "Budi Santoso").unwrap();
    sheet.write_string(1, 1, "3171-2345-6789-0001").unwrap();
    sheet.write_string(1, 2, ttl).unwrap();
    workbook.save(&path).unwrap();
    path
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    registry()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("registry"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    registry()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("registry"));
}

#[test]
fn test_cli_no_command_fails() {
    registry().assert().failure();
}

#[test]
fn test_server_help() {
    Command::cargo_bin("registry-server")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"));
}

// ═══════════════════════════════════════════════════════════════════════════
// CHECK-DATE
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_check_date_day_first() {
    registry()
        .args(["check-date", "13/1/2001", "1990-08-15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("13/01/2001"))
        .stdout(predicate::str::contains("15/08/1990"));
}

#[test]
fn test_check_date_month_first_fails() {
    registry()
        .args(["check-date", "1/13/2001"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("01/13/2001"))
        .stderr(predicate::str::contains("invalid"));
}

// ═══════════════════════════════════════════════════════════════════════════
// TEMPLATE AND IMPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_template_command() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("template.xlsx");
    registry().arg("template").arg(&path).assert().success();
    assert!(path.exists());
}

#[test]
fn test_import_preview_valid() {
    let dir = TempDir::new().unwrap();
    let path = write_upload(&dir, "15.08.1990");
    registry()
        .arg("import")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("3171234567890001"))
        .stdout(predicate::str::contains("--submit"));
}

#[test]
fn test_import_preview_lists_bad_row() {
    let dir = TempDir::new().unwrap();
    let path = write_upload(&dir, "31/02/2020");
    registry()
        .arg("import")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Row 2"));
}

#[test]
fn test_import_submit_blocked_by_errors() {
    let dir = TempDir::new().unwrap();
    let path = write_upload(&dir, "31/02/2020");
    registry()
        .arg("import")
        .arg(&path)
        .arg("--submit")
        .assert()
        .failure();
}

#[test]
fn test_import_missing_file() {
    registry()
        .args(["import", "/nonexistent/upload.xlsx"])
        .assert()
        .failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPORT
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_export_from_json_input() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    std::fs::write(
        &input,
        r#"[{"NAMA": "Budi", "TTL": "1990-08-15"}, {"NAMA": "Siti", "TTL": "01/02/1985"}]"#,
    )
    .unwrap();
    let output = dir.path().join("out.xlsx");

    registry()
        .arg("export")
        .arg(&output)
        .arg("--input")
        .arg(&input)
        .args(["--columns", "NAMA,TTL"])
        .assert()
        .success();
    assert!(output.exists());
}

#[test]
fn test_export_pdf_by_extension() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.json");
    std::fs::write(&input, r#"[{"NAMA": "Budi", "TTL": "15/08/1990"}]"#).unwrap();
    let output = dir.path().join("report.pdf");

    registry()
        .arg("export")
        .arg(&output)
        .arg("--input")
        .arg(&input)
        .args(["--title", "BSTF II", "--columns", "NAMA,TTL"])
        .assert()
        .success();
    assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_export_unknown_format() {
    registry()
        .args(["export", "out.xlsx", "--format", "csv"])
        .assert()
        .failure();
}

#[test]
fn test_unreachable_backend_message() {
    registry()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot reach the server"));
}
