//! Integration tests for model provisioning.

#![allow(clippy::unwrap_used)]

mod common;

use common::{TestServer, tar_gz, zip};
use stemsplit::Error;
use stemsplit::constants::model::TEMP_ARCHIVE;
use stemsplit::error::Stage;
use stemsplit::locking::FileLock;
use stemsplit::provision::{
    SeparationModel, download_blocking, ensure_model, is_provisioned, staging_dir_for,
};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn entries(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_non_empty_dir_skips_network() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    fs::create_dir(&model_dir).unwrap();
    fs::write(model_dir.join("checkpoint"), b"weights").unwrap();

    let server = TestServer::serve(Vec::new());
    ensure_model(&model_dir, Some(server.file_url("2stems.tar.gz").as_str())).unwrap();

    assert_eq!(server.hits(), 0);
    assert_eq!(entries(&model_dir), ["checkpoint"]);
}

#[test]
fn test_empty_dir_without_url_fails_and_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("models").join("2stems");

    let err = ensure_model(&model_dir, None).unwrap_err();

    assert!(matches!(err, Error::ModelMissing { .. }));
    assert!(model_dir.is_dir());
    assert!(entries(&model_dir).is_empty());
    assert_eq!(entries(temp_dir.path().join("models").as_path()), ["2stems"]);
}

#[test]
fn test_downloads_and_extracts_tar_gz() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    let archive = tar_gz(&[
        ("checkpoint", "model_checkpoint_path: \"model\""),
        ("model.index", "index"),
    ]);
    let server = TestServer::serve(archive);

    ensure_model(&model_dir, Some(server.file_url("2stems.tar.gz").as_str())).unwrap();

    assert_eq!(server.hits(), 1);
    assert_eq!(entries(&model_dir), ["checkpoint", "model.index"]);
    assert!(!model_dir.join(TEMP_ARCHIVE).exists());
    assert!(!staging_dir_for(&model_dir).exists());

    // Second call is a no-op.
    ensure_model(&model_dir, Some(server.file_url("2stems.tar.gz").as_str())).unwrap();
    assert_eq!(server.hits(), 1);
}

#[test]
fn test_extracts_zip() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    let server = TestServer::serve(zip(&[("checkpoint", "x"), ("model.meta", "y")]));

    ensure_model(&model_dir, Some(server.file_url("2stems.zip").as_str())).unwrap();

    assert_eq!(entries(&model_dir), ["checkpoint", "model.meta"]);
}

#[test]
fn test_checksum_mismatch_leaves_dir_empty() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    let server = TestServer::serve(tar_gz(&[("checkpoint", "x")]));

    let model = SeparationModel::new(&model_dir)
        .with_url(server.file_url("2stems.tar.gz"))
        .with_sha256("0".repeat(64));
    let err = model.ensure().unwrap_err();

    assert!(matches!(err, Error::ChecksumMismatch { .. }));
    assert!(!is_provisioned(&model_dir));
    assert!(!model_dir.join(TEMP_ARCHIVE).exists());
}

#[test]
fn test_http_error_is_download_failure() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    let server = TestServer::status(404);

    let err = ensure_model(&model_dir, Some(server.file_url("missing.tar.gz").as_str())).unwrap_err();

    assert!(matches!(err, Error::DownloadFailed { .. }));
    assert_eq!(err.stage(), Stage::Provisioning);
    assert!(entries(&model_dir).is_empty());
}

#[test]
fn test_unrecognized_archive_fails() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    let server = TestServer::serve(b"<html>not an archive</html>".to_vec());

    let err = ensure_model(&model_dir, Some(server.file_url("2stems.tar.gz").as_str())).unwrap_err();

    assert!(matches!(err, Error::UnknownArchiveFormat { .. }));
    assert!(!is_provisioned(&model_dir));
}

#[test]
fn test_concurrent_callers_download_once() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    let server = TestServer::serve(tar_gz(&[("checkpoint", "x")]));
    let url = server.file_url("2stems.tar.gz");

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| ensure_model(&model_dir, Some(url.as_str()))))
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
    });

    assert_eq!(server.hits(), 1);
    assert_eq!(entries(&model_dir), ["checkpoint"]);
    assert!(!temp_dir.path().join("2stems.stemsplit.lock").exists());
}

/// Deterministic, poorly compressible text.
fn noise(len: usize) -> String {
    let mut state = 0x2545_f491_u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            char::from(b'a' + (state % 26) as u8)
        })
        .collect()
}

#[test]
fn test_caller_waits_for_in_flight_provisioning() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    fs::create_dir(&model_dir).unwrap();

    // Another provisioner holds the lock and has written part of the model.
    let lock = FileLock::try_acquire(&model_dir).unwrap();
    fs::write(model_dir.join("a_checkpoint"), "x").unwrap();

    let waiter = {
        let dir = model_dir.clone();
        std::thread::spawn(move || ensure_model(&dir, None))
    };
    std::thread::sleep(Duration::from_millis(600));
    assert!(!waiter.is_finished());

    fs::write(model_dir.join("c_index"), "y").unwrap();
    drop(lock);

    waiter.join().unwrap().unwrap();
    assert_eq!(entries(&model_dir), ["a_checkpoint", "c_index"]);
}

#[test]
fn test_truncated_archive_leaves_model_dir_empty() {
    let temp_dir = TempDir::new().unwrap();
    let model_dir = temp_dir.path().join("2stems");
    let weights = noise(256 * 1024);
    let mut archive = tar_gz(&[
        ("a_checkpoint", "model_checkpoint_path: \"model\""),
        ("b_weights", weights.as_str()),
        ("c_index", "index"),
    ]);
    archive.truncate(archive.len() / 2);
    let server = TestServer::serve(archive);

    let err = ensure_model(&model_dir, Some(server.file_url("2stems.tar.gz").as_str())).unwrap_err();

    assert!(matches!(err, Error::ArchiveExtract { .. }));
    assert_eq!(err.stage(), Stage::Provisioning);
    assert!(entries(&model_dir).is_empty());
    assert!(!staging_dir_for(&model_dir).exists());
}

#[test]
fn test_unwritable_archive_is_provisioning_error() {
    let temp_dir = TempDir::new().unwrap();
    let server = TestServer::serve(tar_gz(&[("checkpoint", "x")]));
    let dest = temp_dir.path().join("no").join("such").join("archive");

    let err = download_blocking(&server.file_url("2stems.tar.gz"), &dest).unwrap_err();

    assert!(matches!(err, Error::ArchiveWrite { .. }));
    assert_eq!(err.stage(), Stage::Provisioning);
    assert!(err.to_string().contains("archive"));
}

#[test]
fn test_model_dir_under_file_is_provisioning_error() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("models");
    fs::write(&blocker, b"file").unwrap();
    let server = TestServer::serve(tar_gz(&[("checkpoint", "x")]));

    let err = ensure_model(
        &blocker.join("2stems"),
        Some(server.file_url("2stems.tar.gz").as_str()),
    )
    .unwrap_err();

    assert!(matches!(err, Error::ModelDirCreate { .. }));
    assert_eq!(err.stage(), Stage::Provisioning);
    assert_eq!(server.hits(), 0);
}
