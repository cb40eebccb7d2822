#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_precision_loss)]

//! # Sketchy Dataset
//!
//! Dataset tooling for sketch-based image retrieval: builds the train/test
//! directory layout a triplet network trains on, samples triplets from it,
//! and scores retrieval quality from precomputed embeddings.
//!
//! ## Features
//!
//! - **Manifest-driven split**: photos and sketches listed in the test manifests
//!   go to the test buckets, everything else to train
//! - **Orphan reconciliation**: photos without a sketch in their split are moved
//!   to the other split so every training photo has at least one sketch
//! - **Triplet sampling**: (sketch, photo, photo-of-another-category) batches
//!   with seeded, per-epoch shuffling
//! - **Retrieval evaluation**: recall@K, category precision@K and mAP over
//!   JSON feature files
//! - **CLI Integration**: Optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sketchy_dataset::{prepare_dataset, NoOpProgressReporter, PrepareConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = PrepareConfig::builder()
//!     .source_photo_root("/data/sketchy/photo/tx_000000000000")
//!     .source_sketch_root("/data/sketchy/sketch/tx_000000000000")
//!     .target("dataset")
//!     .clean_target(true)
//!     .build()?;
//!
//! let summary = prepare_dataset(&config, &NoOpProgressReporter)?;
//! println!("{}", summary.layout.training_arguments());
//! # Ok(())
//! # }
//! ```
//!
//! ## Triplet batches
//!
//! ```rust,no_run
//! use sketchy_dataset::{LoaderConfig, TripletIndex, TripletLoader};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let index = TripletIndex::build(
//!     Path::new("dataset/photo-train"),
//!     Path::new("dataset/sketch-triplet-train"),
//! )?;
//! let loader = TripletLoader::new(&index, LoaderConfig { seed: Some(7), ..Default::default() })?;
//! for batch in loader.epoch(0) {
//!     assert!(batch.len() <= loader.config().batch_size);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): Command-line interface, progress bar and subscriber setup
//! - `tracing-json`: JSON log output for the CLI
//!
//! ```toml
//! [dependencies]
//! sketchy-dataset = { version = "0.1", default-features = false }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod layout;
pub mod manifest;
pub mod prepare;
pub mod reconcile;
pub mod services;
pub mod split;
pub mod tracing_config;
pub mod triplet;
pub mod types;
pub mod utils;

// Public API exports
pub use config::{EvalConfig, LoaderConfig, PrepareConfig, PrepareConfigBuilder};
pub use error::{DatasetError, Result};
pub use evaluate::{evaluate_retrieval, rank_row, similarity_matrix, RetrievalMetrics};
pub use features::{FeatureEntry, FeatureSet};
pub use layout::TargetLayout;
pub use manifest::Manifest;
pub use prepare::{prepare_dataset, PrepareSummary};
pub use reconcile::{
    reconcile_dataset, reconcile_dataset_with_progress, reconcile_photos,
    reconcile_photos_with_progress, DatasetReconcileReport, ReconcileReport,
};
pub use services::{
    ConsoleProgressReporter, FileFilter, FileProgress, FileTransferService, NoOpProgressReporter,
    ProcessingStage, ProgressReporter, ProgressTracker, ProgressUpdate,
};
pub use split::{split_tree, split_tree_with_progress, SplitReport};
pub use triplet::{EpochBatches, Triplet, TripletIndex, TripletLoader, TripletSampler};
pub use types::{
    category_of, photo_stem, relative_key, sketch_photo_key, MediaKind, PipelineTimings, Split,
};
pub use utils::{NumericValidator, PathValidator};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;
pub use tracing_config::{events, spans, TracingConfig, TracingFormat};
