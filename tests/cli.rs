use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn moneybags(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("moneybags").expect("bin");
    cmd.env("MONEYBAGS_DATA_DIR", data_dir)
        .env_remove("MONEYBAGS_DATABASE_URL")
        .env("RUST_LOG", "off");
    cmd
}

fn initialized() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    moneybags(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created starter categories"));
    dir
}

#[test]
fn help_lists_commands() {
    let dir = TempDir::new().expect("tempdir");
    moneybags(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn init_seeds_once() {
    let dir = initialized();
    assert!(dir.path().join("config.json").exists());
    assert!(dir.path().join("data").join("moneybags.db").exists());

    moneybags(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already initialized"));

    moneybags(dir.path())
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Salary"))
        .stdout(predicate::str::contains("Travel"));
}

#[test]
fn budget_and_report_workflow() {
    let dir = initialized();

    moneybags(dir.path())
        .args(["template", "add", "2024", "Salary"])
        .assert()
        .success();
    moneybags(dir.path())
        .args(["budget", "set", "Salary", "2024", "1", "4000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 000 kr"));
    moneybags(dir.path())
        .args(["transaction", "add", "Salary", "4200", "--date", "2024-01-25"])
        .assert()
        .success();

    moneybags(dir.path())
        .args(["report", "overview", "2024", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Salary\""));

    moneybags(dir.path())
        .args(["transaction", "recent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 200 kr"));
}

#[test]
fn budget_outside_template_is_rejected() {
    let dir = initialized();
    moneybags(dir.path())
        .args(["budget", "set", "Salary", "1999", "1", "100"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("template"));
}

#[test]
fn unknown_category_fails() {
    let dir = initialized();
    moneybags(dir.path())
        .args(["category", "rename", "Nope", "Still nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn export_json_to_file() {
    let dir = initialized();
    let out = dir.path().join("export.json");

    moneybags(dir.path())
        .args(["export", "all", "--pretty", "-o"])
        .arg(&out)
        .assert()
        .success();

    let content = std::fs::read_to_string(&out).expect("export written");
    let json: serde_json::Value = serde_json::from_str(&content).expect("valid json");
    assert_eq!(json["schema_version"], "1.0.0");
    assert!(json["categories"].as_array().is_some_and(|c| c.len() == 10));
}

#[test]
fn migrate_lists_sql_files() {
    let dir = TempDir::new().expect("tempdir");
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    moneybags(dir.path())
        .args(["migrate", "--dir"])
        .arg(&migrations)
        .assert()
        .success()
        .stdout(predicate::str::contains("001_initial_schema.sql"));
}
