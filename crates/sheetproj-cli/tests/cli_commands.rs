//! Command integration tests
//!
//! ## Exit Code Contract
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Import succeeded (warnings allowed) |
//! | 1 | Import failed, or warnings under --strict |

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use tempfile::TempDir;

const PLAN: &str = "\
ID,Name,Begin date,End date,Resources,Predecessors,Outline number
1,design,23/07/12,26/07/12,Joe,,1
2,sketch,23/07/12,24/07/12,Joe,,1.1
3,launch,27/07/12,27/07/12,,1,2

Name,ID,Default role
Joe,1,Default:1
";

fn sheetproj_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sheetproj"))
}

fn fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn run(args: &[&str], file: &Path) -> Output {
    Command::new(sheetproj_binary())
        .args(args)
        .arg(file)
        .args(["--start", "2012-07-23"])
        .output()
        .expect("failed to execute sheetproj")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// =============================================================================
// check
// =============================================================================

#[test]
fn check_reports_what_was_built() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", PLAN);

    let output = run(&["check"], &plan);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("3 tasks, 1 resources, 1 dependencies, 2 assignments"));
}

#[test]
fn check_tree_lists_outline() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", PLAN);

    let output = run(&["check", "--tree"], &plan);
    let text = stdout(&output);
    assert!(text.contains("\n1 design  2012-07-23 .. 2012-07-26\n"), "{text}");
    assert!(text.contains("  1.1 sketch  2012-07-23 .. 2012-07-24\n"), "{text}");
    assert!(text.contains("2 launch  2012-07-27 .. 2012-07-27 (milestone)"), "{text}");
}

#[test]
fn warnings_exit_zero_unless_strict() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", "Name,Resources\nt1,Ghost\n");

    let output = run(&["check"], &plan);
    assert_eq!(output.status.code(), Some(0));
    let errors = stderr(&output);
    assert!(errors.contains("warning[W018]"), "{errors}");
    assert!(errors.contains("plan.csv:2"), "{errors}");

    let output = run(&["check", "--strict"], &plan);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[W018]"));
}

#[test]
fn quiet_hides_warnings() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", "Name,Resources\nt1,Ghost\n");

    let output = run(&["check", "--quiet"], &plan);
    assert_eq!(output.status.code(), Some(0));
    assert!(!stderr(&output).contains("W018"));
}

#[test]
fn unrecognized_input_fails() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", "Foo,Bar\n1,2\n");

    let output = run(&["check"], &plan);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[E004]"));
}

#[test]
fn missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run(&["check"], &dir.path().join("absent.csv"));
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[E001]"));
}

#[test]
fn unknown_extension_needs_input_format() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.dat", "Name\nt1\n");

    let output = run(&["check"], &plan);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--input-format"));

    let output = run(&["check", "--input-format", "csv"], &plan);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
}

#[test]
fn check_json_output() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", "Name,Resources\nt1,Ghost\nt2,\n");

    let output = run(&["check", "--format", "json"], &plan);
    assert_eq!(output.status.code(), Some(0));
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("Output should be valid JSON");

    assert_eq!(parsed["tasks"], 2);
    assert_eq!(parsed["tables"], 1);
    let codes: Vec<&str> = parsed["diagnostics"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec!["W009", "W009", "W018"]);
}

#[test]
fn config_file_and_overrides() {
    let dir = TempDir::new().unwrap();
    let config = fixture(
        &dir,
        "import.toml",
        "short_date_format = \"%Y-%m-%d\"\ncsv_delimiter = \";\"\n",
    );
    let plan = fixture(&dir, "plan.csv", "Name;Begin date;End date\nt1;2012-07-23;2012-07-26\n");

    let output = Command::new(sheetproj_binary())
        .arg("check")
        .arg(&plan)
        .arg("--config")
        .arg(&config)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(parsed["diagnostics"].as_array().unwrap().len(), 0);

    // a comma delimiter leaves one unrecognizable column
    let output = Command::new(sheetproj_binary())
        .arg("check")
        .arg(&plan)
        .arg("--config")
        .arg(&config)
        .args(["--delimiter", ","])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[E004]"));
}

#[test]
fn invalid_date_format_fails() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", "Name\nt1\n");

    let output = run(&["check", "--date-format", "%Q"], &plan);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error[E005]"));
}

// =============================================================================
// convert
// =============================================================================

#[test]
fn convert_csv_to_xlsx_and_back() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", PLAN);
    let workbook = dir.path().join("plan.xlsx");

    let output = Command::new(sheetproj_binary())
        .arg("convert")
        .arg(&plan)
        .arg(&workbook)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Wrote 3 tasks and 1 resources"));

    let output = run(&["check"], &workbook);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("3 tasks, 1 resources, 1 dependencies, 2 assignments"));
    assert!(!stderr(&output).contains("warning"));
}

#[test]
fn strict_convert_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let plan = fixture(&dir, "plan.csv", "Name,Resources\nt1,Ghost\n");
    let target = dir.path().join("out.csv");

    let output = Command::new(sheetproj_binary())
        .arg("convert")
        .arg(&plan)
        .arg(&target)
        .arg("--strict")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(!target.exists());
}
