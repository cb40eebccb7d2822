//! Core domain types shared by the split, reconcile and sampling stages

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

/// Which half of the dataset a file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Test,
}

impl Split {
    /// The split files are moved to when they fail reconciliation
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Train => Self::Test,
            Self::Test => Self::Train,
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Train => write!(f, "train"),
            Self::Test => write!(f, "test"),
        }
    }
}

/// Photo vs sketch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Sketch,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo => write!(f, "photo"),
            Self::Sketch => write!(f, "sketch"),
        }
    }
}

/// Stem of a photo: the file name up to the first `.`
///
/// `n02691156_58.jpg` becomes `n02691156_58`.
#[must_use]
pub fn photo_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Key linking a sketch to its photo: the file name up to the first `-`
///
/// `n02691156_58-3.png` becomes `n02691156_58`.
#[must_use]
pub fn sketch_photo_key(file_name: &str) -> &str {
    file_name.split('-').next().unwrap_or(file_name)
}

/// Render a relative path with `/` separators regardless of platform
///
/// Manifest entries are written with forward slashes, so lookups must use the
/// same rendering.
#[must_use]
pub fn relative_key(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Category of a file: its parent directory relative to the root, `""` at top level
#[must_use]
pub fn category_of(rel: &Path) -> String {
    rel.parent().map(relative_key).unwrap_or_default()
}

/// Wall-clock timings of a preparation run, in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTimings {
    pub manifests_ms: u64,
    pub split_photos_ms: u64,
    pub split_sketches_ms: u64,
    pub reconcile_ms: u64,
    pub total_ms: u64,
}
