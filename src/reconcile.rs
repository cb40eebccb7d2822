//! Orphan reconciliation between photo and sketch buckets
//!
//! A photo is an orphan in a split when no sketch in the same category of
//! that split carries its stem as photo key. Orphans are moved to the
//! opposite split's photo bucket.

use crate::error::Result;
use crate::layout::TargetLayout;
use crate::services::{FileFilter, FileTransferService, NoOpProgressReporter, ProgressTracker};
use crate::types::{photo_stem, relative_key, sketch_photo_key, Split};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of reconciling one photo bucket against its sketch bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Relative paths of photos moved to the other bucket
    pub moved: Vec<String>,
    /// Photos that had at least one matching sketch
    pub matched: usize,
    /// Orphans left in place: listed in the skip set, or without a sketch
    /// in the destination split
    pub held_back: Vec<String>,
}

/// Outcome of reconciling both splits of a prepared dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetReconcileReport {
    /// Train photos without train sketches, now in `photo-test`
    pub train_to_test: Vec<String>,
    /// Test photos without test sketches, now in `photo-train`
    pub test_to_train: Vec<String>,
    /// Photos without sketches in either split (left in `photo-test`)
    pub unmatched: Vec<String>,
}

/// Photo keys of the sketches in each category directory, loaded lazily
struct SketchKeyCache<'a> {
    sketch_root: &'a Path,
    by_category: HashMap<PathBuf, HashSet<String>>,
}

impl<'a> SketchKeyCache<'a> {
    fn new(sketch_root: &'a Path) -> Self {
        Self {
            sketch_root,
            by_category: HashMap::new(),
        }
    }

    fn has_sketch(&mut self, category: &Path, stem: &str) -> Result<bool> {
        if !self.by_category.contains_key(category) {
            let dir = self.sketch_root.join(category);
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "No sketch directory for category");
            }
            let keys = FileTransferService::list_file_names(&dir)?
                .iter()
                .map(|name| sketch_photo_key(name).to_string())
                .collect();
            self.by_category.insert(category.to_path_buf(), keys);
        }
        Ok(self
            .by_category
            .get(category)
            .is_some_and(|keys| keys.contains(stem)))
    }
}

/// Move every photo in `photo_root` without a matching sketch to `other_photo_root`
///
/// Photos whose relative path is in `skip` are never moved; orphans among
/// them are reported in [`ReconcileReport::held_back`].
pub fn reconcile_photos(
    photo_root: &Path,
    sketch_root: &Path,
    other_photo_root: &Path,
    skip: &HashSet<String>,
) -> Result<ReconcileReport> {
    let reporter = NoOpProgressReporter;
    let tracker = ProgressTracker::new(&reporter);
    reconcile_photos_with_progress(photo_root, sketch_root, other_photo_root, skip, &tracker)
}

/// [`reconcile_photos`] with per-file progress reporting
pub fn reconcile_photos_with_progress(
    photo_root: &Path,
    sketch_root: &Path,
    other_photo_root: &Path,
    skip: &HashSet<String>,
    tracker: &ProgressTracker<'_>,
) -> Result<ReconcileReport> {
    move_orphans(photo_root, sketch_root, other_photo_root, None, skip, tracker)
}

/// Move orphans, holding back those without a sketch under `other_sketch_root`
fn move_orphans(
    photo_root: &Path,
    sketch_root: &Path,
    other_photo_root: &Path,
    other_sketch_root: Option<&Path>,
    skip: &HashSet<String>,
    tracker: &ProgressTracker<'_>,
) -> Result<ReconcileReport> {
    let span = crate::spans::reconcile(photo_root, sketch_root);
    let _enter = span.enter();

    let photos = FileTransferService::collect_files(photo_root, &FileFilter::all())?;
    let total = photos.len();
    let mut sketches = SketchKeyCache::new(sketch_root);
    let mut other_sketches = other_sketch_root.map(SketchKeyCache::new);
    let mut report = ReconcileReport::default();

    for (index, photo) in photos.iter().enumerate() {
        let key = relative_key(&photo.relative);
        tracker.report_file(index + 1, total, &key);

        let file_name = photo
            .relative
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let category = photo.relative.parent().unwrap_or_else(|| Path::new(""));

        if sketches.has_sketch(category, photo_stem(&file_name))? {
            report.matched += 1;
            continue;
        }

        if skip.contains(&key) {
            report.held_back.push(key);
            continue;
        }
        if let Some(other) = other_sketches.as_mut() {
            if !other.has_sketch(category, photo_stem(&file_name))? {
                debug!(photo = %key, "No sketch in destination split, keeping photo");
                report.held_back.push(key);
                continue;
            }
        }

        let dest = other_photo_root.join(&photo.relative);
        FileTransferService::move_file(&photo.path, &dest)?;
        info!(
            "moving file: {} -> {}",
            photo.path.display(),
            dest.display()
        );
        report.moved.push(key);
    }

    Ok(report)
}

/// Reconcile both splits of a prepared dataset
///
/// Train photos lacking train sketches move to test first. Test photos
/// lacking test sketches then move to train only when train holds a sketch
/// for them; the rest have no sketches in either split and stay in test.
pub fn reconcile_dataset(layout: &TargetLayout) -> Result<DatasetReconcileReport> {
    let reporter = NoOpProgressReporter;
    let tracker = ProgressTracker::new(&reporter);
    reconcile_dataset_with_progress(layout, &tracker)
}

/// [`reconcile_dataset`] with per-file progress reporting
pub fn reconcile_dataset_with_progress(
    layout: &TargetLayout,
    tracker: &ProgressTracker<'_>,
) -> Result<DatasetReconcileReport> {
    let first = reconcile_split(layout, Split::Train, &HashSet::new(), tracker)?;

    let arrived: HashSet<String> = first.moved.iter().cloned().collect();
    let second = reconcile_split(layout, Split::Test, &arrived, tracker)?;

    if !second.held_back.is_empty() {
        warn!(
            count = second.held_back.len(),
            "Photos have no sketches in either split"
        );
    }

    Ok(DatasetReconcileReport {
        train_to_test: first.moved,
        test_to_train: second.moved,
        unmatched: second.held_back,
    })
}

/// Move orphans of `split` into the photo bucket of the opposite split
///
/// Only test orphans are checked against the destination: `photo-train`
/// must never receive a photo without a training sketch.
fn reconcile_split(
    layout: &TargetLayout,
    split: Split,
    skip: &HashSet<String>,
    tracker: &ProgressTracker<'_>,
) -> Result<ReconcileReport> {
    debug!(from = %split, to = %split.opposite(), "Reconciling split");
    let destination_sketches = match split {
        Split::Test => Some(layout.sketch_dir(Split::Train)),
        Split::Train => None,
    };
    move_orphans(
        layout.photo_dir(split),
        layout.sketch_dir(split),
        layout.photo_dir(split.opposite()),
        destination_sketches,
        skip,
        tracker,
    )
}
