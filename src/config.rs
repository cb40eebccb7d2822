//! Configuration types for preparation, triplet loading and evaluation

use crate::error::{DatasetError, Result};
use crate::utils::{NumericValidator, PathValidator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default manifest listing test photos
pub const DEFAULT_TEST_IMAGE_FILES: &str = "test_img.txt";
/// Default manifest listing test sketches
pub const DEFAULT_TEST_SKETCH_FILES: &str = "test_sketch.txt";
/// Default dataset target root
pub const DEFAULT_TARGET: &str = "dataset/";

/// Configuration for a dataset preparation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Root of the source photo tree (`<category>/<photo>`)
    pub source_photo_root: PathBuf,

    /// Root of the source sketch tree (`<category>/<sketch>`)
    pub source_sketch_root: PathBuf,

    /// Training dataset root directory
    pub target: PathBuf,

    /// Remove everything in the target root before splitting
    pub clean_target: bool,

    /// Manifest of photo paths (relative to the photo root) used as test photos
    pub test_image_files: PathBuf,

    /// Manifest of sketch paths (relative to the sketch root) used as test sketches
    pub test_sketch_files: PathBuf,

    /// Optional glob on file names; non-matching files are ignored
    pub file_pattern: Option<String>,

    /// Skip dot-files such as `.DS_Store` while walking sources
    pub skip_hidden: bool,
}

impl Default for PrepareConfig {
    fn default() -> Self {
        Self {
            source_photo_root: PathBuf::new(),
            source_sketch_root: PathBuf::new(),
            target: PathBuf::from(DEFAULT_TARGET),
            clean_target: false,
            test_image_files: PathBuf::from(DEFAULT_TEST_IMAGE_FILES),
            test_sketch_files: PathBuf::from(DEFAULT_TEST_SKETCH_FILES),
            file_pattern: None,
            skip_hidden: false,
        }
    }
}

impl PrepareConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sketchy_dataset::PrepareConfig;
    ///
    /// let config = PrepareConfig::builder()
    ///     .source_photo_root("/data/photo/tx_000000000000")
    ///     .source_sketch_root("/data/sketch/tx_000000000000")
    ///     .target("/tmp/dataset")
    ///     .build()
    ///     .unwrap();
    /// assert!(!config.clean_target);
    /// ```
    #[must_use]
    pub fn builder() -> PrepareConfigBuilder {
        PrepareConfigBuilder::default()
    }

    /// Validate configuration parameters
    ///
    /// # Validation Rules
    ///
    /// - Both source roots must be set
    /// - The target must not be an existing file
    /// - The target must not live inside a source root (the walk would see its own output)
    /// - No source root may live inside the target (cleaning it would delete the sources)
    /// - `file_pattern`, when set, must be a valid glob
    pub fn validate(&self) -> Result<()> {
        if self.source_photo_root.as_os_str().is_empty() {
            return Err(DatasetError::invalid_config("source photo root is not set"));
        }
        if self.source_sketch_root.as_os_str().is_empty() {
            return Err(DatasetError::invalid_config("source sketch root is not set"));
        }

        PathValidator::validate_target_root(&self.target)?;

        for source in [&self.source_photo_root, &self.source_sketch_root] {
            if PathValidator::is_nested(&self.target, source) {
                return Err(DatasetError::invalid_config(format!(
                    "Target '{}' must not be inside source root '{}'",
                    self.target.display(),
                    source.display()
                )));
            }
            if PathValidator::is_nested(source, &self.target) {
                return Err(DatasetError::invalid_config(format!(
                    "Source root '{}' must not be inside target '{}'",
                    source.display(),
                    self.target.display()
                )));
            }
        }

        if let Some(pattern) = &self.file_pattern {
            glob::Pattern::new(pattern).map_err(|e| {
                DatasetError::invalid_config(format!("Invalid file pattern '{}': {}", pattern, e))
            })?;
        }

        Ok(())
    }
}

/// Builder for `PrepareConfig`
#[derive(Debug, Default)]
pub struct PrepareConfigBuilder {
    config: PrepareConfig,
}

impl PrepareConfigBuilder {
    #[must_use]
    pub fn source_photo_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.source_photo_root = path.into();
        self
    }

    #[must_use]
    pub fn source_sketch_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.source_sketch_root = path.into();
        self
    }

    #[must_use]
    pub fn target<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.target = path.into();
        self
    }

    #[must_use]
    pub fn clean_target(mut self, clean: bool) -> Self {
        self.config.clean_target = clean;
        self
    }

    #[must_use]
    pub fn test_image_files<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.test_image_files = path.into();
        self
    }

    #[must_use]
    pub fn test_sketch_files<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.test_sketch_files = path.into();
        self
    }

    #[must_use]
    pub fn file_pattern(mut self, pattern: Option<String>) -> Self {
        self.config.file_pattern = pattern;
        self
    }

    #[must_use]
    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.config.skip_hidden = skip;
        self
    }

    /// Build the configuration, validating it first
    pub fn build(self) -> Result<PrepareConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration for the triplet batch loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Triplets per batch
    pub batch_size: usize,

    /// Reshuffle anchor order every epoch
    pub shuffle: bool,

    /// Drop the trailing batch when it is smaller than `batch_size`
    pub drop_last: bool,

    /// Seed for deterministic shuffling and negative sampling
    pub seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 16,
            shuffle: true,
            drop_last: true,
            seed: None,
        }
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DatasetError::config_value_error(
                "batch size",
                self.batch_size,
                ">= 1",
                Some(16),
            ));
        }
        Ok(())
    }
}

/// Configuration for retrieval evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Cut-offs at which recall and precision are reported
    pub top_k: Vec<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            top_k: vec![1, 5, 10],
        }
    }
}

impl EvalConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k.is_empty() {
            return Err(DatasetError::invalid_config("at least one top-k cut-off is required"));
        }
        for &k in &self.top_k {
            NumericValidator::validate_positive(k, "top-k cut-off")?;
        }
        Ok(())
    }
}
