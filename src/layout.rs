//! Target directory layout of a prepared dataset
//!
//! ```text
//! dataset
//!   ├── photo-train            # training photos
//!   ├── sketch-triplet-train   # training sketches
//!   ├── photo-test             # test photos
//!   └── sketch-triplet-test    # test sketches
//! ```

use crate::error::{DatasetError, Result};
use crate::types::{MediaKind, Split};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const PHOTO_TRAIN_DIR: &str = "photo-train";
pub const SKETCH_TRAIN_DIR: &str = "sketch-triplet-train";
pub const PHOTO_TEST_DIR: &str = "photo-test";
pub const SKETCH_TEST_DIR: &str = "sketch-triplet-test";

/// Resolved paths of the four dataset buckets under a target root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetLayout {
    pub root: PathBuf,
    pub photo_train: PathBuf,
    pub sketch_train: PathBuf,
    pub photo_test: PathBuf,
    pub sketch_test: PathBuf,
}

impl TargetLayout {
    #[must_use]
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            photo_train: root.join(PHOTO_TRAIN_DIR),
            sketch_train: root.join(SKETCH_TRAIN_DIR),
            photo_test: root.join(PHOTO_TEST_DIR),
            sketch_test: root.join(SKETCH_TEST_DIR),
            root,
        }
    }

    /// Photo bucket for a split
    #[must_use]
    pub fn photo_dir(&self, split: Split) -> &Path {
        match split {
            Split::Train => &self.photo_train,
            Split::Test => &self.photo_test,
        }
    }

    /// Sketch bucket for a split
    #[must_use]
    pub fn sketch_dir(&self, split: Split) -> &Path {
        match split {
            Split::Train => &self.sketch_train,
            Split::Test => &self.sketch_test,
        }
    }

    /// Bucket for a media kind and split
    #[must_use]
    pub fn dir(&self, kind: MediaKind, split: Split) -> &Path {
        match kind {
            MediaKind::Photo => self.photo_dir(split),
            MediaKind::Sketch => self.sketch_dir(split),
        }
    }

    /// All four buckets
    #[must_use]
    pub fn children(&self) -> [&Path; 4] {
        [
            &self.photo_train,
            &self.sketch_train,
            &self.photo_test,
            &self.sketch_test,
        ]
    }

    /// Create the target root and its buckets
    ///
    /// With `clean` set, an existing root is removed first. Existing
    /// directories are left untouched otherwise, so calling this twice is a
    /// no-op.
    pub fn prepare(&self, clean: bool) -> Result<()> {
        if clean && self.root.exists() {
            info!(target_dir = %self.root.display(), "Removing existing target directory");
            std::fs::remove_dir_all(&self.root)
                .map_err(|e| DatasetError::file_io_error("remove target directory", &self.root, &e))?;
        }

        std::fs::create_dir_all(&self.root)
            .map_err(|e| DatasetError::file_io_error("create target directory", &self.root, &e))?;

        for child in self.children() {
            if !child.exists() {
                debug!(dir = %child.display(), "Creating dataset directory");
            }
            std::fs::create_dir_all(child)
                .map_err(|e| DatasetError::file_io_error("create dataset directory", child, &e))?;
        }

        Ok(())
    }

    /// Argument block handed to the downstream trainer
    #[must_use]
    pub fn training_arguments(&self) -> String {
        format!(
            "--photo_root {} \\\n--sketch_root {} \\\n--photo_test {} \\\n--sketch_test {}",
            self.photo_train.display(),
            self.sketch_train.display(),
            self.photo_test.display(),
            self.sketch_test.display()
        )
    }
}
