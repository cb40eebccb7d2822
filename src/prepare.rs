//! End-to-end dataset preparation: layout, split, reconcile

use crate::config::PrepareConfig;
use crate::error::{DatasetError, Result};
use crate::layout::TargetLayout;
use crate::manifest::Manifest;
use crate::reconcile::{reconcile_dataset_with_progress, DatasetReconcileReport};
use crate::services::{FileFilter, ProcessingStage, ProgressReporter, ProgressTracker};
use crate::split::{split_tree_with_progress, SplitReport};
use crate::types::{MediaKind, PipelineTimings, Split};
use crate::utils::PathValidator;
use chrono::{DateTime, Utc};
use instant::Instant;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Summary of a preparation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareSummary {
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Resolved target layout
    pub layout: TargetLayout,
    /// Number of entries in the test photo manifest
    pub photo_manifest_entries: usize,
    /// Number of entries in the test sketch manifest
    pub sketch_manifest_entries: usize,
    pub photos: SplitReport,
    pub sketches: SplitReport,
    pub reconcile: DatasetReconcileReport,
    pub timings: PipelineTimings,
}

impl PrepareSummary {
    /// Write the summary as pretty JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatasetError::file_io_error("create report directory", parent, &e)
                })?;
            }
        }
        std::fs::write(path_ref, json)
            .map_err(|e| DatasetError::file_io_error("write report", path_ref, &e))
    }
}

/// Prepare a train/test dataset from source photo and sketch trees
///
/// 1. validate the configuration and source roots
/// 2. create (optionally clean) the target layout
/// 3. load both manifests; a missing manifest only warns
/// 4. split photos, then sketches
/// 5. reconcile orphaned photos in both directions
pub fn prepare_dataset(
    config: &PrepareConfig,
    reporter: &dyn ProgressReporter,
) -> Result<PrepareSummary> {
    let span = crate::spans::prepare(&config.target);
    let _enter = span.enter();

    let mut tracker = ProgressTracker::new(reporter);
    let mut timings = PipelineTimings::default();

    tracker.report_stage(ProcessingStage::Initialization);
    config.validate()?;
    PathValidator::validate_source_root(&config.source_photo_root)?;
    PathValidator::validate_source_root(&config.source_sketch_root)?;

    let layout = TargetLayout::new(&config.target);
    layout.prepare(config.clean_target)?;
    let filter = FileFilter::new(config.file_pattern.as_deref(), config.skip_hidden)?;

    tracker.report_stage(ProcessingStage::LoadingManifests);
    let stage_start = Instant::now();
    let photo_manifest = load_manifest(&config.test_image_files, "test photo/image", &tracker)?;
    let sketch_manifest = load_manifest(&config.test_sketch_files, "test sketch", &tracker)?;
    timings.manifests_ms = stage_start.elapsed().as_millis() as u64;

    tracker.report_stage_with_description(
        ProcessingStage::SplittingPhotos,
        format!("Splitting photos ({} test entries)", photo_manifest.len()),
    );
    let stage_start = Instant::now();
    let photos = split_media(
        MediaKind::Photo,
        &config.source_photo_root,
        &layout,
        &photo_manifest,
        &filter,
        &tracker,
    )?;
    timings.split_photos_ms = stage_start.elapsed().as_millis() as u64;

    tracker.report_stage_with_description(
        ProcessingStage::SplittingSketches,
        format!("Splitting sketches ({} test entries)", sketch_manifest.len()),
    );
    let stage_start = Instant::now();
    let sketches = split_media(
        MediaKind::Sketch,
        &config.source_sketch_root,
        &layout,
        &sketch_manifest,
        &filter,
        &tracker,
    )?;
    timings.split_sketches_ms = stage_start.elapsed().as_millis() as u64;

    tracker.report_stage(ProcessingStage::Reconciling);
    let stage_start = Instant::now();
    let reconcile = reconcile_dataset_with_progress(&layout, &tracker)?;
    timings.reconcile_ms = stage_start.elapsed().as_millis() as u64;
    if !reconcile.unmatched.is_empty() {
        tracker.report_error(&format!(
            "{} photo(s) have no sketches in either split",
            reconcile.unmatched.len()
        ));
    }

    timings.total_ms = tracker.elapsed_ms();
    tracker.report_stage(ProcessingStage::Completed);
    tracker.report_completion(&timings);

    info!(
        photos_train = photos.train,
        photos_test = photos.test,
        sketches_train = sketches.train,
        sketches_test = sketches.test,
        moved_to_test = reconcile.train_to_test.len(),
        moved_to_train = reconcile.test_to_train.len(),
        "Dataset prepared"
    );

    Ok(PrepareSummary {
        finished_at: Utc::now(),
        layout,
        photo_manifest_entries: photo_manifest.len(),
        sketch_manifest_entries: sketch_manifest.len(),
        photos,
        sketches,
        reconcile,
        timings,
    })
}

fn split_media(
    kind: MediaKind,
    source: &Path,
    layout: &TargetLayout,
    manifest: &Manifest,
    filter: &FileFilter,
    tracker: &ProgressTracker<'_>,
) -> Result<SplitReport> {
    debug!(kind = %kind, source = %source.display(), "Splitting source tree");
    split_tree_with_progress(
        source,
        layout.dir(kind, Split::Train),
        layout.dir(kind, Split::Test),
        manifest,
        filter,
        tracker,
    )
}

fn load_manifest(path: &Path, description: &str, tracker: &ProgressTracker<'_>) -> Result<Manifest> {
    if !path.exists() {
        tracker.report_error(&format!("{} file list needs to be set", description));
    }
    Manifest::load_or_empty(path, description)
}
