//! Manifest-driven train/test split of a source tree

use crate::error::Result;
use crate::manifest::Manifest;
use crate::services::{FileFilter, FileTransferService, NoOpProgressReporter, ProgressTracker};
use crate::types::relative_key;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, warn};

/// Outcome of splitting one source tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitReport {
    /// Files copied to the train bucket
    pub train: usize,
    /// Files copied to the test bucket
    pub test: usize,
    /// Manifest entries that matched no file in the source
    pub missing_from_source: Vec<String>,
}

impl SplitReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.train + self.test
    }
}

/// Copy every file under `source` into `train_dir` or `test_dir`
///
/// Files whose relative path is listed in `manifest` go to `test_dir`, all
/// others to `train_dir`. The sub-directory structure is preserved.
pub fn split_tree(
    source: &Path,
    train_dir: &Path,
    test_dir: &Path,
    manifest: &Manifest,
    filter: &FileFilter,
) -> Result<SplitReport> {
    let reporter = NoOpProgressReporter;
    let tracker = ProgressTracker::new(&reporter);
    split_tree_with_progress(source, train_dir, test_dir, manifest, filter, &tracker)
}

/// [`split_tree`] with per-file progress reporting
pub fn split_tree_with_progress(
    source: &Path,
    train_dir: &Path,
    test_dir: &Path,
    manifest: &Manifest,
    filter: &FileFilter,
    tracker: &ProgressTracker<'_>,
) -> Result<SplitReport> {
    let span = crate::spans::split(source, manifest.len());
    let _enter = span.enter();

    let files = FileTransferService::collect_files(source, filter)?;
    let total = files.len();
    let mut report = SplitReport::default();
    let mut seen = HashSet::with_capacity(manifest.len());

    for (index, file) in files.iter().enumerate() {
        let key = relative_key(&file.relative);
        let dest_root = if manifest.contains(&key) {
            seen.insert(key.clone());
            report.test += 1;
            test_dir
        } else {
            report.train += 1;
            train_dir
        };

        let dest = dest_root.join(&file.relative);
        FileTransferService::copy_preserving(&file.path, &dest)?;
        tracker.report_file(index + 1, total, &key);
    }

    report.missing_from_source = manifest
        .iter()
        .filter(|entry| !seen.contains(*entry))
        .map(str::to_string)
        .collect();

    if !report.missing_from_source.is_empty() {
        warn!(
            source = %source.display(),
            missing = report.missing_from_source.len(),
            "Manifest lists files that are not present in the source"
        );
    }
    debug!(
        source = %source.display(),
        train = report.train,
        test = report.test,
        "Split complete"
    );

    Ok(report)
}
