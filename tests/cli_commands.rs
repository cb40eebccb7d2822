//! CLI integration tests
//!
//! Runs the built binary against temporary source trees and checks exit
//! codes, stdout and the files it writes.

#![cfg(feature = "cli")]

mod common;

use common::{list_tree, SketchyFixture};
use std::path::PathBuf;
use std::process::Command;

fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_sketchy-dataset"))
}

#[test]
fn test_prepare_prints_training_arguments() {
    let fixture = SketchyFixture::standard();
    let report = fixture.path().join("report.json");

    let output = Command::new(binary())
        .arg("prepare")
        .arg("--source-photo-root")
        .arg(&fixture.photo_root)
        .arg("--source-sketch-root")
        .arg(&fixture.sketch_root)
        .arg("--target")
        .arg(&fixture.target)
        .arg("--test-image-files")
        .arg(&fixture.image_manifest)
        .arg("--test-sketch-files")
        .arg(&fixture.sketch_manifest)
        .arg("--clean-target")
        .arg("--report")
        .arg(&report)
        .output()
        .expect("Failed to execute CLI");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--photo_root"));
    assert!(stdout.contains("--sketch_test"));
    assert!(stdout.contains("photo-train"));
    assert!(report.exists());
    assert_eq!(
        list_tree(&fixture.target.join("photo-train")),
        vec!["airplane/n1.jpg", "airplane/n3.jpg"]
    );
}

#[test]
fn test_prepare_missing_source_fails() {
    let fixture = SketchyFixture::new();
    let output = Command::new(binary())
        .arg("prepare")
        .arg("--source-photo-root")
        .arg(fixture.path().join("absent/photo"))
        .arg("--source-sketch-root")
        .arg(fixture.path().join("absent/sketch"))
        .arg("--target")
        .arg(&fixture.target)
        .output()
        .expect("Failed to execute CLI");

    assert!(!output.status.success());
}

#[test]
fn test_invalid_clean_target_value_is_rejected() {
    let output = Command::new(binary())
        .args(["prepare", "--clean-target", "sometimes"])
        .output()
        .expect("Failed to execute CLI");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Boolean value expected"));
}

#[test]
fn test_triplets_writes_json() {
    let fixture = SketchyFixture::new();
    fixture
        .photo("cat/c1.jpg")
        .photo("dog/d1.jpg")
        .sketch("cat/c1-1.png")
        .sketch("dog/d1-1.png");
    let output_path = fixture.path().join("triplets.json");

    let output = Command::new(binary())
        .arg("triplets")
        .arg("--photo-root")
        .arg(&fixture.photo_root)
        .arg("--sketch-root")
        .arg(&fixture.sketch_root)
        .args(["--batch-size", "2", "--epochs", "2", "--seed", "1"])
        .arg("--output")
        .arg(&output_path)
        .output()
        .expect("Failed to execute CLI");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    let epochs = json.as_array().unwrap();
    assert_eq!(epochs.len(), 2);
    assert_eq!(epochs[1]["epoch"], 1);
    assert_eq!(epochs[0]["batches"][0].as_array().unwrap().len(), 2);
}
