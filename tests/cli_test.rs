//! Integration tests for the command-line interface.

#![allow(clippy::unwrap_used)]

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{sine, write_wav};
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn stemsplit(config_dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("stemsplit");
    cmd.env("STEMSPLIT_CONFIG", config_dir.path().join("config.toml"))
        .env_remove("STEMSPLIT_MODEL_DIR")
        .env_remove("STEMSPLIT_MODEL_URL")
        .env_remove("STEMS_DIR")
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

#[test]
fn test_help_lists_commands() {
    let temp_dir = TempDir::new().unwrap();
    stemsplit(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("separate"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("process"));
}

#[test]
fn test_config_path_honors_env() {
    let temp_dir = TempDir::new().unwrap();
    stemsplit(&temp_dir)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_then_show() {
    let temp_dir = TempDir::new().unwrap();
    stemsplit(&temp_dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));
    assert!(temp_dir.path().join("config.toml").is_file());

    stemsplit(&temp_dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    stemsplit(&temp_dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("program = \"ffmpeg\""));
}

#[test]
fn test_analyze_json() {
    let temp_dir = TempDir::new().unwrap();
    let wav = temp_dir.path().join("a440.wav");
    write_wav(&wav, &sine(440.0, 22_050, 2.0), 22_050);

    let assert = stemsplit(&temp_dir)
        .arg("analyze")
        .arg(&wav)
        .arg("--json")
        .assert()
        .success();

    let json = stdout_json(assert.get_output());
    assert_eq!(json["spec_version"], "1.0");
    assert_eq!(json["result_type"], "analysis");
    assert_eq!(json["payload"]["key"], "A");
    assert!(json["payload"]["tempo"].is_number());
}

#[test]
fn test_analyze_text() {
    let temp_dir = TempDir::new().unwrap();
    let wav = temp_dir.path().join("a440.wav");
    write_wav(&wav, &sine(440.0, 22_050, 2.0), 22_050);

    stemsplit(&temp_dir)
        .arg("analyze")
        .arg(&wav)
        .assert()
        .success()
        .stdout(predicate::str::contains("Key: A"))
        .stdout(predicate::str::contains("BPM"));
}

#[test]
fn test_analyze_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    stemsplit(&temp_dir)
        .arg("analyze")
        .arg(temp_dir.path().join("missing.wav"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_model_status_json() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("models").join("2stems");

    let assert = stemsplit(&temp_dir)
        .args(["model", "status", "--json", "--model-dir"])
        .arg(&model_dir)
        .assert()
        .success();

    let json = stdout_json(assert.get_output());
    assert_eq!(json["result_type"], "model_status");
    assert_eq!(json["payload"]["provisioned"], false);
}

#[test]
fn test_separate_without_model_fails() {
    let temp_dir = TempDir::new().unwrap();
    let wav = temp_dir.path().join("song.wav");
    write_wav(&wav, &sine(440.0, 8_000, 0.5), 8_000);
    let out = temp_dir.path().join("stems");

    stemsplit(&temp_dir)
        .arg("separate")
        .arg(&wav)
        .arg("-o")
        .arg(&out)
        .arg("--model-dir")
        .arg(temp_dir.path().join("models").join("2stems"))
        .arg("--model-url=")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error:"))
        .stderr(predicate::str::contains("model"));

    assert!(!out.join("song").exists());
}

#[test]
fn test_invalid_model_url_rejected() {
    let temp_dir = TempDir::new().unwrap();
    stemsplit(&temp_dir)
        .args(["model", "status", "--model-url", "ftp://example.com/m.tar.gz"])
        .assert()
        .failure();
}

#[test]
fn test_process_empty_dir_fails() {
    let temp_dir = TempDir::new().unwrap();
    let inputs = temp_dir.path().join("inputs");
    std::fs::create_dir(&inputs).unwrap();

    stemsplit(&temp_dir)
        .arg("process")
        .arg(&inputs)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no audio files found"));
}
