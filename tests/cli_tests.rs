//! # Binary Tests
//!
//! Runs the `eden` executable for the commands that never touch the state
//! table. Diagnostics go to stderr, listings to stdout.

mod common;

use assert_cmd::Command;
use common::{profile_section, write_config};
use eden::profile::ParameterId;
use predicates::prelude::*;
use tempfile::TempDir;

fn eden_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("eden").unwrap();
    cmd.env_remove("RUST_LOG")
        .env("EDEN_LOG_COLOR", "0")
        .env("HOME", home.path());
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    eden_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_includes_package_version() {
    let home = TempDir::new().unwrap();
    eden_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_setup_writes_profile() {
    let home = TempDir::new().unwrap();
    let path = home.path().join(".eden").join("config");

    eden_cmd(&home)
        .args(["config", "setup", "-c", path.to_str().unwrap()])
        .args(["--target-cluster", "dev"])
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Setting target_cluster to dev in profile default",
        ));

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("[default]"));
    assert!(written.contains("target_cluster = dev"));
}

#[test]
fn test_setup_without_parameters_fails() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("config");

    eden_cmd(&home)
        .args(["config", "setup", "-c", path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No parameters to update were given"));
    assert!(!path.exists());
}

#[test]
fn test_check_complete_profile() {
    let home = TempDir::new().unwrap();
    let path = write_config(home.path(), &profile_section("default", None));

    eden_cmd(&home)
        .args(["config", "check", "-c", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("No errors found"));
}

#[test]
fn test_check_reports_missing_parameter() {
    let home = TempDir::new().unwrap();
    let path = write_config(
        home.path(),
        &profile_section("default", Some(ParameterId::ConfigBucketKey)),
    );

    eden_cmd(&home)
        .args(["config", "check", "-c", path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Necessary key config_bucket_key is not provided for profile default",
        ))
        .stderr(predicate::str::contains("Found 1 errors"));
}

#[test]
fn test_check_override_fills_gap() {
    let home = TempDir::new().unwrap();
    let path = write_config(
        home.path(),
        &profile_section("default", Some(ParameterId::ConfigBucketKey)),
    );

    eden_cmd(&home)
        .args(["config", "check", "-c", path.to_str().unwrap()])
        .args(["--config-bucket-key", "endpoints.json"])
        .assert()
        .success();

    // check never writes its overrides back
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains("config_bucket_key"));
}

#[test]
fn test_check_missing_file_fails() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("absent");

    eden_cmd(&home)
        .args(["config", "check", "-c", path.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is empty"));
}

#[test]
fn test_unknown_subcommand_is_usage_error() {
    let home = TempDir::new().unwrap();
    eden_cmd(&home)
        .args(["config", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn test_empty_profile_name_leaves_config_readable() {
    let home = TempDir::new().unwrap();
    let path = write_config(home.path(), &profile_section("default", None));

    eden_cmd(&home)
        .args(["config", "setup", "-c", path.to_str().unwrap(), "-p", ""])
        .args(["--name-prefix", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid section name"));

    eden_cmd(&home)
        .args(["config", "check", "-c", path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(predicate::str::contains("No errors found"));
}
