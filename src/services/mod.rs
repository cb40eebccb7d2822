//! Service layer
//!
//! File system operations and progress reporting, kept apart from the
//! split/reconcile/sampling logic.

pub mod fs;
pub mod progress;

pub use fs::{FileFilter, FileTransferService, WalkedFile};
pub use progress::{
    ConsoleProgressReporter, FileProgress, NoOpProgressReporter, ProcessingStage,
    ProgressReporter, ProgressTracker, ProgressUpdate,
};
#[cfg(feature = "cli")]
pub use progress::{create_cli_progress_reporter, BarProgressReporter};
