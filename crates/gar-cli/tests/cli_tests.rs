//! Integration tests for gar-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use gar_core::test_utils::create_test_zip;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn gar_cmd() -> Command {
    cargo_bin_cmd!("gar")
}

fn create_test_tree(root: &Path) {
    fs::create_dir_all(root.join("a")).unwrap();
    fs::write(root.join("a/b.txt"), "0123456789").unwrap();
    fs::write(root.join("top.txt"), "01234567890123456789").unwrap();
}

#[test]
fn test_version_flag() {
    gar_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("gar"));
}

#[test]
fn test_help_flag() {
    gar_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive manager"))
        .stdout(predicate::str::contains("compress"));
}

#[test]
fn test_compress_extract_round_trip() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = temp.path().join("project");
    create_test_tree(&source);
    let archive = temp.path().join("project.tar.gz");
    let restore = temp.path().join("restore");

    gar_cmd()
        .arg("compress")
        .arg(&source)
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archive created"));

    gar_cmd()
        .arg("extract")
        .arg(&archive)
        .arg(&restore)
        .assert()
        .success()
        .stdout(predicate::str::contains("Files extracted:  2"));

    assert_eq!(fs::read_to_string(restore.join("a/b.txt")).unwrap(), "0123456789");
    assert_eq!(
        fs::read_to_string(restore.join("top.txt")).unwrap(),
        "01234567890123456789"
    );
}

#[test]
fn test_compress_default_output_name() {
    let temp = TempDir::new().expect("failed to create temp dir");
    create_test_tree(&temp.path().join("project"));

    gar_cmd()
        .current_dir(temp.path())
        .args(["compress", "project"])
        .assert()
        .success();
    assert!(temp.path().join("project.zip").is_file());

    gar_cmd()
        .current_dir(temp.path())
        .args(["compress", "--format", "tgz", "project"])
        .assert()
        .success();
    assert!(temp.path().join("project.tar.gz").is_file());
}

#[test]
fn test_list_shows_names_and_sizes() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = temp.path().join("project");
    create_test_tree(&source);
    let archive = temp.path().join("project.zip");

    gar_cmd()
        .args(["compress", "-q"])
        .arg(&source)
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    gar_cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("10  a/b.txt"))
        .stdout(predicate::str::contains("20  top.txt"))
        .stdout(predicate::str::contains("Total: 2 files"));
}

#[test]
fn test_encrypted_round_trip_and_wrong_password() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = temp.path().join("project");
    create_test_tree(&source);
    let archive = temp.path().join("secret.zip");
    let restore = temp.path().join("restore");

    gar_cmd()
        .args(["compress", "-p", "secret"])
        .arg(&source)
        .arg(&archive)
        .assert()
        .success();

    gar_cmd()
        .args(["extract", "-p", "wrong"])
        .arg(&archive)
        .arg(&restore)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption failed"))
        .stderr(predicate::str::contains("HINT"));
    assert!(!restore.exists());

    gar_cmd()
        .args(["extract", "-p", "secret"])
        .arg(&archive)
        .arg(&restore)
        .assert()
        .success();
    assert_eq!(fs::read_to_string(restore.join("a/b.txt")).unwrap(), "0123456789");
}

#[test]
fn test_extract_to_current_dir_rejects_traversal() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let work = temp.path().join("work");
    fs::create_dir(&work).unwrap();
    let archive = temp.path().join("evil.zip");
    fs::write(
        &archive,
        create_test_zip(&[("../evil.txt", b"pwned"), ("ok.txt", b"fine")]),
    )
    .unwrap();

    gar_cmd()
        .current_dir(&work)
        .args(["extract", "-w", "1"])
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Security violation"));

    assert!(!temp.path().join("evil.txt").exists());
    assert_eq!(fs::read_to_string(work.join("ok.txt")).unwrap(), "fine");
}

#[test]
fn test_missing_archive_fails() {
    let temp = TempDir::new().expect("failed to create temp dir");

    gar_cmd()
        .arg("list")
        .arg(temp.path().join("nope.zip"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("ERROR"));
}

#[test]
fn test_json_output() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let source = temp.path().join("project");
    create_test_tree(&source);
    let archive = temp.path().join("project.zip");

    let output = gar_cmd()
        .args(["--json", "compress"])
        .arg(&source)
        .arg(&archive)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "compress");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["files_added"], 2);

    let output = gar_cmd()
        .args(["--json", "list"])
        .arg(&archive)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["total_size"], 30);
}

#[test]
fn test_json_error_envelope() {
    let temp = TempDir::new().expect("failed to create temp dir");

    let output = gar_cmd()
        .args(["--json", "extract"])
        .arg(temp.path().join("nope.zip"))
        .output()
        .unwrap();
    assert!(!output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["operation"], "extract");
    assert_eq!(json["status"], "error");
}

#[test]
fn test_completion_bash() {
    gar_cmd()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("gar"));
}
