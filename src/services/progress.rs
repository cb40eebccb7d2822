//! Progress reporting service
//!
//! This module separates progress reporting concerns from the pipeline,
//! allowing the CLI to plug in a progress bar while library callers stay quiet.

use crate::types::PipelineTimings;
use instant::Instant;

/// Stages of a dataset preparation run
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingStage {
    /// Validating configuration and preparing target directories
    Initialization,
    /// Reading the test manifests
    LoadingManifests,
    /// Copying photos into train/test buckets
    SplittingPhotos,
    /// Copying sketches into train/test buckets
    SplittingSketches,
    /// Moving photos that lack sketches to the other split
    Reconciling,
    /// Run completed
    Completed,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Initialization => "Preparing target directories",
            ProcessingStage::LoadingManifests => "Loading test manifests",
            ProcessingStage::SplittingPhotos => "Splitting photos",
            ProcessingStage::SplittingSketches => "Splitting sketches",
            ProcessingStage::Reconciling => "Reconciling orphaned photos",
            ProcessingStage::Completed => "Preparation completed",
        }
    }

    /// Get the typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::Initialization => 2,
            ProcessingStage::LoadingManifests => 5,
            ProcessingStage::SplittingPhotos => 10,
            ProcessingStage::SplittingSketches => 45,
            ProcessingStage::Reconciling => 90,
            ProcessingStage::Completed => 100,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current processing stage
    pub stage: ProcessingStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since processing started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    #[must_use]
    pub fn new(stage: ProcessingStage, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }

    #[must_use]
    pub fn with_description(
        stage: ProcessingStage,
        description: String,
        start_time: Instant,
    ) -> Self {
        Self {
            progress: stage.progress_percentage(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
            description,
        }
    }
}

/// Per-file progress inside a copy or reconcile stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProgress {
    /// Files handled so far in this stage
    pub completed: usize,
    /// Files in this stage
    pub total: usize,
    /// Relative path of the current file
    pub current: String,
}

/// Trait for reporting progress during dataset preparation
pub trait ProgressReporter: Send + Sync {
    /// Report a stage transition
    fn report_progress(&self, update: ProgressUpdate);

    /// Report completion with final timings
    fn report_completion(&self, timings: &PipelineTimings);

    /// Report a non-fatal problem
    fn report_error(&self, stage: ProcessingStage, error: &str);

    /// Report per-file progress within the current stage
    fn report_file_progress(&self, progress: &FileProgress) {
        // Only interactive reporters care about per-file granularity
        let _ = progress;
    }
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _timings: &PipelineTimings) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Console progress reporter that logs progress through `tracing`
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            tracing::info!(
                "[{}%] {} ({}ms elapsed)",
                update.progress,
                update.description,
                update.elapsed_ms
            );
        } else {
            tracing::info!("[{}%] {}", update.progress, update.description);
        }
    }

    fn report_completion(&self, timings: &PipelineTimings) {
        tracing::info!("✅ Dataset prepared in {}ms", timings.total_ms);

        if self.verbose {
            tracing::info!("  📊 Detailed timings:");
            tracing::info!("    • Manifests: {}ms", timings.manifests_ms);
            tracing::info!("    • Photo split: {}ms", timings.split_photos_ms);
            tracing::info!("    • Sketch split: {}ms", timings.split_sketches_ms);
            tracing::info!("    • Reconcile: {}ms", timings.reconcile_ms);
        }
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        tracing::warn!("⚠️  Problem during {}: {}", stage.description(), error);
    }

    fn report_file_progress(&self, progress: &FileProgress) {
        if self.verbose {
            tracing::trace!(
                completed = progress.completed,
                total = progress.total,
                file = %progress.current,
                "File progress"
            );
        }
    }
}

/// Progress bar reporter for interactive terminals
#[cfg(feature = "cli")]
pub struct BarProgressReporter {
    bar: indicatif::ProgressBar,
    verbose: bool,
}

#[cfg(feature = "cli")]
impl BarProgressReporter {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        use indicatif::{ProgressBar, ProgressStyle};

        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        bar.set_style(style);
        Self { bar, verbose }
    }
}

#[cfg(feature = "cli")]
impl ProgressReporter for BarProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        self.bar.set_position(0);
        self.bar.set_length(0);
        self.bar
            .set_message(format!("[{}%] {}", update.progress, update.description));
    }

    fn report_completion(&self, timings: &PipelineTimings) {
        self.bar
            .finish_with_message(format!("✅ Dataset prepared in {}ms", timings.total_ms));
        if self.verbose {
            tracing::info!(
                manifests_ms = timings.manifests_ms,
                split_photos_ms = timings.split_photos_ms,
                split_sketches_ms = timings.split_sketches_ms,
                reconcile_ms = timings.reconcile_ms,
                "Detailed timings"
            );
        }
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        self.bar.suspend(|| {
            tracing::warn!("⚠️  Problem during {}: {}", stage.description(), error);
        });
    }

    fn report_file_progress(&self, progress: &FileProgress) {
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.completed as u64);
    }
}

/// Pick the CLI reporter: a progress bar with `--progress`, log lines otherwise
#[cfg(feature = "cli")]
#[must_use]
pub fn create_cli_progress_reporter(enable_progress: bool, verbose: bool) -> Box<dyn ProgressReporter> {
    if enable_progress {
        Box::new(BarProgressReporter::new(verbose))
    } else {
        Box::new(ConsoleProgressReporter::new(verbose))
    }
}

/// Progress tracker that manages timing and progress reporting
pub struct ProgressTracker<'a> {
    reporter: &'a dyn ProgressReporter,
    start_time: Instant,
    current_stage: Option<ProcessingStage>,
}

impl<'a> ProgressTracker<'a> {
    #[must_use]
    pub fn new(reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            reporter,
            start_time: Instant::now(),
            current_stage: None,
        }
    }

    /// Report progress for a specific stage
    pub fn report_stage(&mut self, stage: ProcessingStage) {
        self.current_stage = Some(stage.clone());
        let update = ProgressUpdate::new(stage, self.start_time);
        self.reporter.report_progress(update);
    }

    /// Report progress with custom description
    pub fn report_stage_with_description(&mut self, stage: ProcessingStage, description: String) {
        self.current_stage = Some(stage.clone());
        let update = ProgressUpdate::with_description(stage, description, self.start_time);
        self.reporter.report_progress(update);
    }

    /// Report per-file progress
    pub fn report_file(&self, completed: usize, total: usize, current: &str) {
        self.reporter.report_file_progress(&FileProgress {
            completed,
            total,
            current: current.to_string(),
        });
    }

    /// Report completion with final timings
    pub fn report_completion(&self, timings: &PipelineTimings) {
        self.reporter.report_completion(timings);
    }

    /// Report a non-fatal problem at the current stage
    pub fn report_error(&self, error: &str) {
        let stage = self
            .current_stage
            .clone()
            .unwrap_or(ProcessingStage::Initialization);
        self.reporter.report_error(stage, error);
    }

    /// Get the elapsed time since tracking started
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Get the current processing stage
    #[must_use]
    pub fn current_stage(&self) -> Option<&ProcessingStage> {
        self.current_stage.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Test progress reporter that captures reports for verification
    #[derive(Default)]
    struct TestProgressReporter {
        progress_updates: Arc<Mutex<Vec<ProgressUpdate>>>,
        completions: Arc<Mutex<Vec<PipelineTimings>>>,
        errors: Arc<Mutex<Vec<(ProcessingStage, String)>>>,
        files: Arc<Mutex<Vec<FileProgress>>>,
    }

    impl ProgressReporter for TestProgressReporter {
        fn report_progress(&self, update: ProgressUpdate) {
            self.progress_updates.lock().unwrap().push(update);
        }

        fn report_completion(&self, timings: &PipelineTimings) {
            self.completions.lock().unwrap().push(timings.clone());
        }

        fn report_error(&self, stage: ProcessingStage, error: &str) {
            self.errors.lock().unwrap().push((stage, error.to_string()));
        }

        fn report_file_progress(&self, progress: &FileProgress) {
            self.files.lock().unwrap().push(progress.clone());
        }
    }

    #[test]
    fn test_processing_stage_descriptions() {
        assert_eq!(
            ProcessingStage::Reconciling.description(),
            "Reconciling orphaned photos"
        );
        assert_eq!(
            ProcessingStage::Completed.description(),
            "Preparation completed"
        );
    }

    #[test]
    fn test_processing_stage_progress_ordering() {
        let stages = [
            ProcessingStage::Initialization,
            ProcessingStage::LoadingManifests,
            ProcessingStage::SplittingPhotos,
            ProcessingStage::SplittingSketches,
            ProcessingStage::Reconciling,
            ProcessingStage::Completed,
        ];
        for pair in stages.windows(2) {
            if let [a, b] = pair {
                assert!(a.progress_percentage() < b.progress_percentage());
            }
        }
        assert_eq!(ProcessingStage::Completed.progress_percentage(), 100);
    }

    #[test]
    fn test_progress_update_creation() {
        let update = ProgressUpdate::new(ProcessingStage::SplittingPhotos, Instant::now());
        assert_eq!(update.stage, ProcessingStage::SplittingPhotos);
        assert_eq!(update.progress, 10);
        assert_eq!(update.description, "Splitting photos");
        assert!(update.elapsed_ms < 1000);
    }

    #[test]
    fn test_no_op_progress_reporter() {
        let reporter = NoOpProgressReporter;
        reporter.report_progress(ProgressUpdate::new(
            ProcessingStage::Reconciling,
            Instant::now(),
        ));
        reporter.report_completion(&PipelineTimings::default());
        reporter.report_error(ProcessingStage::Reconciling, "test error");
        reporter.report_file_progress(&FileProgress {
            completed: 1,
            total: 2,
            current: "a/b.jpg".to_string(),
        });
    }

    #[test]
    fn test_progress_tracker() {
        let reporter = TestProgressReporter::default();
        let mut tracker = ProgressTracker::new(&reporter);
        assert!(tracker.current_stage().is_none());

        tracker.report_stage(ProcessingStage::Initialization);
        tracker.report_stage_with_description(
            ProcessingStage::SplittingPhotos,
            "Splitting 3 photos".to_string(),
        );
        tracker.report_file(1, 3, "cat/1.jpg");
        tracker.report_error("missing manifest");
        tracker.report_completion(&PipelineTimings {
            total_ms: 42,
            ..PipelineTimings::default()
        });

        let updates = reporter.progress_updates.lock().unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates.get(1).unwrap().description, "Splitting 3 photos");

        let errors = reporter.errors.lock().unwrap();
        assert_eq!(
            errors.first().unwrap(),
            &(ProcessingStage::SplittingPhotos, "missing manifest".to_string())
        );

        let files = reporter.files.lock().unwrap();
        assert_eq!(files.first().unwrap().current, "cat/1.jpg");

        assert_eq!(reporter.completions.lock().unwrap().first().unwrap().total_ms, 42);
        assert_eq!(
            tracker.current_stage(),
            Some(&ProcessingStage::SplittingPhotos)
        );
    }

    #[cfg(feature = "cli")]
    #[test]
    fn test_create_cli_progress_reporter() {
        for enable in [false, true] {
            let reporter = create_cli_progress_reporter(enable, false);
            reporter.report_progress(ProgressUpdate::new(
                ProcessingStage::SplittingSketches,
                Instant::now(),
            ));
            reporter.report_file_progress(&FileProgress {
                completed: 1,
                total: 4,
                current: "cat/1-1.png".to_string(),
            });
            reporter.report_completion(&PipelineTimings::default());
        }
    }

    #[test]
    fn test_trait_object_safety() {
        let reporters: Vec<Box<dyn ProgressReporter>> = vec![
            Box::new(NoOpProgressReporter),
            Box::new(ConsoleProgressReporter::new(true)),
        ];
        for reporter in &reporters {
            reporter.report_error(ProcessingStage::Initialization, "ignored");
        }
    }
}
