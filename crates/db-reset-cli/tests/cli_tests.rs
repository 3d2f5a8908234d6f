//! CLI integration tests for db-reset.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for error conditions reachable without a database.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the db-reset binary.
fn cmd() -> Command {
    Command::cargo_bin("db-reset").unwrap()
}

/// Write `yaml` to a temporary config file.
fn config_file(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", yaml).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("reset"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_reset_subcommand_help() {
    cmd()
        .args(["reset", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--dialect"))
        .stdout(predicate::str::contains("--schema-owner"));
}

#[test]
fn test_health_check_command_exists() {
    cmd()
        .args(["health-check", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Test the database connection"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("db-reset"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_global_flag_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("[default: config.yaml]"))
        .stdout(predicate::str::contains("--log-format"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("--verbosity"))
        .stdout(predicate::str::contains("[default: info]"))
        .stdout(predicate::str::contains("--output-json"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

// =============================================================================
// Exit Code Tests
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error, not a config error
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "reset"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("IO error"));
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let file = config_file("invalid: yaml: content: [\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "reset"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_missing_required_fields_exits_with_code_1() {
    let file = config_file("dialect: mysql\nconnection:\n  driver: mysql\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "reset"])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_driver_exits_with_code_1() {
    let file = config_file(
        "dialect: db2\nconnection:\n  driver: db2\n  host: localhost\n  database: app\n  user: app\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "reset"])
        .assert()
        .code(1);
}

#[test]
fn test_blank_host_is_a_config_error() {
    let file = config_file(
        "dialect: postgresql\nconnection:\n  driver: postgres\n  host: \"\"\n  database: app\n  user: app\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "reset"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_unreachable_server_exits_with_code_2() {
    // Port 1 on loopback refuses connections
    let file = config_file(
        "dialect: postgresql\nconnection:\n  driver: postgres\n  host: 127.0.0.1\n  port: 1\n  database: app\n  user: app\n  password: secret\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "reset"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Connection error"));
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
