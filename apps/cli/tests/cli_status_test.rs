//! Comprehensive integration tests for the `gantry status` command.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to initialize a workspace for testing
fn init_workspace(temp_dir: &TempDir) {
    let temp_path = temp_dir.path().to_str().unwrap();
    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.arg("init").arg(temp_path).assert().success();
}

#[test]
fn test_status_no_workspace() {
    // Run status outside of a workspace
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("gantry").unwrap();

    cmd.current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No gantry.toml found"));
}

#[test]
fn test_status_in_fresh_workspace() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gantry Status"))
        .stdout(predicate::str::contains("pending"))
        .stdout(predicate::str::contains("gantry run"));
}

#[test]
fn test_status_shows_active_configuration() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("platform.example.com"))
        .stdout(predicate::str::contains("cats-dogs"));
}

#[test]
fn test_status_lists_every_pipeline_step() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Prepare environment"))
        .stdout(predicate::str::contains("Build cpu image"))
        .stdout(predicate::str::contains("Build gpu image"))
        .stdout(predicate::str::contains("Stage dataset"))
        .stdout(predicate::str::contains("Train model"))
        .stdout(predicate::str::contains("Fetch metrics"))
        .stdout(predicate::str::contains("Compile model"))
        .stdout(predicate::str::contains("Deploy endpoint"));
}

#[test]
fn test_status_json_output() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    let assert =
        cmd.current_dir(temp_dir.path()).arg("status").arg("--json").assert().success();

    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);

    // Verify it's valid JSON
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("Status JSON output should be valid JSON");

    assert!(json.is_object(), "Status JSON should be an object");
    let steps = json["steps"].as_array().expect("steps should be an array");
    assert_eq!(steps.len(), 8, "one entry per pipeline step");
    for step in steps {
        assert_eq!(step["complete"], serde_json::Value::Bool(false));
        assert!(step["completed_at"].is_null());
    }
    assert_eq!(json["endpoint"], "gantry-classifier-endpoint");
}

#[test]
fn test_status_reflects_recorded_steps() {
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

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("complete"))
        .stdout(predicate::str::contains("2026-08-23T10:00:00"))
        .stdout(predicate::str::contains("gantry run --resume"));
}

#[test]
fn test_status_in_subdirectory_of_workspace() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);

    // Create a subdirectory
    let subdir = temp_dir.path().join("subdir");
    std::fs::create_dir_all(&subdir).unwrap();

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(&subdir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Gantry Status"));
}

#[test]
fn test_status_with_config_flag() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);
    let manifest = temp_dir.path().join("gantry.toml");

    // Somewhere outside the workspace entirely
    let elsewhere = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(elsewhere.path())
        .arg("status")
        .arg("--config")
        .arg(manifest.to_str().unwrap())
        .assert()
        .success()
        .stdout(predicate::str::contains("Gantry Status"));
}

#[test]
fn test_status_rejects_invalid_manifest() {
    let temp_dir = TempDir::new().unwrap();
    init_workspace(&temp_dir);

    // Break a required field
    let manifest_path = temp_dir.path().join("gantry.toml");
    let broken = std::fs::read_to_string(&manifest_path)
        .unwrap()
        .replace("https://platform.example.com", "not-a-url");
    std::fs::write(&manifest_path, broken).unwrap();

    let mut cmd = Command::cargo_bin("gantry").unwrap();
    cmd.current_dir(temp_dir.path())
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}
