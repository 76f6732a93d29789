//! Integration tests for tempo and key analysis.

#![allow(clippy::unwrap_used)]

mod common;

use common::{click_track, sine, write_wav};
use stemsplit::Error;
use stemsplit::analysis::{PitchClass, analyze};
use stemsplit::constants::CHORDS_PLACEHOLDER;
use stemsplit::error::Stage;
use tempfile::TempDir;

#[test]
fn test_a440_is_key_a() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a440.wav");
    write_wav(&path, &sine(440.0, 44_100, 3.0), 44_100);

    let result = analyze(&path).unwrap();

    assert_eq!(result.key, PitchClass::A);
    assert_eq!(result.chords, CHORDS_PLACEHOLDER);
    assert!(result.tempo >= 0.0);
}

#[test]
fn test_click_track_tempo() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("clicks.wav");
    write_wav(&path, &click_track(120.0, 44_100, 20.0), 44_100);

    let result = analyze(&path).unwrap();

    assert!(
        (result.tempo - 120.0).abs() <= 5.0,
        "expected ~120 BPM, got {:.2}",
        result.tempo
    );
}

#[test]
fn test_analysis_is_deterministic() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("clicks.wav");
    write_wav(&path, &click_track(100.0, 22_050, 10.0), 22_050);

    let first = analyze(&path).unwrap();
    let second = analyze(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_silence_has_zero_tempo() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("silence.wav");
    write_wav(&path, &vec![0.0; 44_100 * 2], 44_100);

    let result = analyze(&path).unwrap();

    assert!(result.tempo.abs() < f64::EPSILON);
    assert_eq!(result.key, PitchClass::C);
}

#[test]
fn test_missing_file_is_analysis_stage_error() {
    let temp_dir = TempDir::new().unwrap();
    let err = analyze(&temp_dir.path().join("missing.wav")).unwrap_err();

    assert!(matches!(err, Error::AudioOpen { .. }));
    assert_eq!(err.stage(), Stage::Analysis);
}

#[test]
fn test_result_serializes_key_label() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("fsharp.wav");
    // F#4
    write_wav(&path, &sine(369.99, 22_050, 2.0), 22_050);

    let json = serde_json::to_value(analyze(&path).unwrap()).unwrap();

    assert_eq!(json["key"], "F#");
    assert_eq!(json["chords"], CHORDS_PLACEHOLDER);
    assert!(json["tempo"].is_number());
}
