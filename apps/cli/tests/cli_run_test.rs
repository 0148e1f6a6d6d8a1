//! Comprehensive integration tests for the `gantry run` command.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to initialize a workspace for testing
fn init_workspace(temp_dir: &TempDir) {
    let temp_path = temp_dir.path().to_str().unwrap();
    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.arg("init").arg(temp_path).assert().success();
}

/// Helper that records every pipeline step as complete in the ledger
fn write_completed_ledger(temp_dir: &TempDir) {
    let steps = [
        "prepare",
        "build-image-cpu",
        "build-image-gpu",
        "stage-dataset",
        "train",
        "fetch-metrics",
        "compile",
        "deploy",
    ];
    let mut records = serde_json::Map::new();
    for step in steps {
        records.insert(
            step.to_string(),
            serde_json::json!({
                "completed_at": "2026-08-23T10:00:00Z",
                "outputs": { "endpoint_name": "gantry-classifier-endpoint" }
            }),
        );
    }
    let ledger = serde_json::json!({ "steps": records });
    let path = temp_dir.path().join(".gantry").join("state").join("pipeline.json");
    std::fs::write(path, serde_json::to_string_pretty(&ledger).unwrap()).unwrap();
}

#[test]
fn test_run_no_workspace() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No gantry.toml found"));
}

#[test]
fn test_run_requires_token() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .env_remove("GANTRY_API_TOKEN")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("GANTRY_API_TOKEN"));
}

#[test]
fn test_run_guards_a_completed_ledger() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);
    write_completed_ledger(&temp_dir);

    // The guard fires before any platform access, so no token is needed
    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .env_remove("GANTRY_API_TOKEN")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("A completed run is already recorded"))
        .stderr(predicate::str::contains("--resume"));
}

#[test]
fn test_run_resume_passes_the_completed_guard() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);
    write_completed_ledger(&temp_dir);

    // With --resume the guard steps aside; the next failure is the missing token
    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .env_remove("GANTRY_API_TOKEN")
        .arg("run")
        .arg("--resume")
        .assert()
        .failure()
        .stderr(predicate::str::contains("A completed run is already recorded").not())
        .stderr(predicate::str::contains("GANTRY_API_TOKEN"));
}

#[test]
fn test_run_partial_ledger_skips_the_guard() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);

    let ledger = r#"{
  "steps": {
    "prepare": {
      "completed_at": "2026-08-23T10:00:00Z",
      "outputs": {}
    }
  }
}"#;
    let ledger_path = temp_dir.path().join(".gantry").join("state").join("pipeline.json");
    std::fs::write(ledger_path, ledger).unwrap();

    // A half-finished run is not "already recorded"; it proceeds to wiring
    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .env_remove("GANTRY_API_TOKEN")
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("A completed run is already recorded").not())
        .stderr(predicate::str::contains("GANTRY_API_TOKEN"));
}
