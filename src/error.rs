//! Error types for dataset preparation, sampling and evaluation

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for dataset operations
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Error types for dataset operations
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory traversal errors
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Feature or report (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A source root given to the pipeline does not exist
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Malformed manifest line or file
    #[error("Manifest error: {0}")]
    ManifestParse(String),

    /// Negative sampling needs at least two categories
    #[error("Triplet sampling needs at least 2 categories, found {found}")]
    InsufficientCategories { found: usize },

    /// Sketch and photo embeddings disagree on dimensionality
    #[error("Feature dimension mismatch: sketches have {sketch}, photos have {photo}")]
    DimensionMismatch { sketch: usize, photo: usize },

    /// A feature set without entries was given to evaluation
    #[error("Feature set '{0}' is empty")]
    EmptyFeatureSet(String),

    /// A feature vector failed validation
    #[error("Invalid feature: {0}")]
    InvalidFeature(String),
}

impl DatasetError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new manifest error
    pub fn manifest<S: Into<String>>(msg: S) -> Self {
        Self::ManifestParse(msg.into())
    }

    /// Create a new invalid feature error
    pub fn invalid_feature<S: Into<String>>(msg: S) -> Self {
        Self::InvalidFeature(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<Path>>(operation: &str, path: P, error: &std::io::Error) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error with valid ranges
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }
}
