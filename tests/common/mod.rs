//! Shared fixtures for integration tests
//!
//! Builds small Sketchy-style source trees (`<category>/<file>`) in a
//! temporary directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Source photo/sketch trees plus manifests inside a temp directory
pub struct SketchyFixture {
    pub temp_dir: TempDir,
    pub photo_root: PathBuf,
    pub sketch_root: PathBuf,
    pub image_manifest: PathBuf,
    pub sketch_manifest: PathBuf,
    pub target: PathBuf,
}

impl SketchyFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let fixture = Self {
            photo_root: root.join("source/photo/tx_000000000000"),
            sketch_root: root.join("source/sketch/tx_000000000000"),
            image_manifest: root.join("test_img.txt"),
            sketch_manifest: root.join("test_sketch.txt"),
            target: root.join("dataset"),
            temp_dir,
        };
        fs::create_dir_all(&fixture.photo_root).expect("Failed to create photo root");
        fs::create_dir_all(&fixture.sketch_root).expect("Failed to create sketch root");
        fixture
    }

    pub fn photo(&self, rel: &str) -> &Self {
        write_file(&self.photo_root.join(rel), rel);
        self
    }

    pub fn sketch(&self, rel: &str) -> &Self {
        write_file(&self.sketch_root.join(rel), rel);
        self
    }

    pub fn manifests(&self, photos: &[&str], sketches: &[&str]) -> &Self {
        fs::write(&self.image_manifest, photos.join("\n")).expect("Failed to write manifest");
        fs::write(&self.sketch_manifest, sketches.join("\n")).expect("Failed to write manifest");
        self
    }

    /// Two categories with a mix of split and orphaned files
    pub fn standard() -> Self {
        let fixture = Self::new();
        fixture
            .photo("airplane/n1.jpg")
            .photo("airplane/n2.jpg")
            .photo("airplane/n3.jpg")
            .photo("cat/n4.jpg")
            .photo("cat/n5.jpg")
            .sketch("airplane/n1-1.png")
            .sketch("airplane/n1-2.png")
            .sketch("airplane/n2-1.png")
            .sketch("airplane/n3-1.png")
            .sketch("cat/n4-1.png")
            .sketch("cat/n5-1.png")
            .manifests(
                // n3's only sketch stays in train, so n3 must come back to train
                &["airplane/n2.jpg", "airplane/n3.jpg", "cat/n5.jpg"],
                // n4's only sketch goes to test, so n4 must move to test
                &["airplane/n2-1.png", "cat/n4-1.png", "cat/n5-1.png"],
            );
        fixture
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }
}

fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, contents).expect("Failed to write fixture file");
}

/// Sorted relative paths of every file under `root`
pub fn list_tree(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path()
                .strip_prefix(root)
                .ok()
                .map(|p| p.to_string_lossy().replace('\\', "/"))
        })
        .collect();
    files.sort();
    files
}
