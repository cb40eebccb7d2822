//! Embedding files produced by an external feature extractor
//!
//! A feature file is a JSON document holding one vector per photo or sketch,
//! keyed by its dataset-relative path.

use crate::error::{DatasetError, Result};
use crate::types::category_of;
use crate::utils::NumericValidator;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Embedding of a single file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureEntry {
    /// Path relative to the split root, e.g. `cat/n0001.jpg`
    pub path: String,
    pub category: String,
    pub vector: Vec<f32>,
}

impl FeatureEntry {
    /// Build an entry, taking the category from the path's parent directory
    #[must_use]
    pub fn new<S: Into<String>>(path: S, vector: Vec<f32>) -> Self {
        let path = path.into();
        let category = category_of(Path::new(&path));
        Self {
            path,
            category,
            vector,
        }
    }

    /// File name component of [`FeatureEntry::path`]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// A set of embeddings sharing one model and dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Name of the model that produced the vectors
    pub model: String,
    pub dimension: usize,
    pub entries: Vec<FeatureEntry>,
}

impl FeatureSet {
    /// Create a set from entries; the dimension is taken from the first one
    pub fn from_entries<S: Into<String>>(model: S, entries: Vec<FeatureEntry>) -> Result<Self> {
        let dimension = entries.first().map_or(0, |e| e.vector.len());
        let set = Self {
            model: model.into(),
            dimension,
            entries,
        };
        set.validate()?;
        Ok(set)
    }

    /// Load and validate a feature file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| DatasetError::file_io_error("read feature file", path_ref, &e))?;
        let set: Self = serde_json::from_str(&content)?;
        set.validate()?;

        info!(
            path = %path_ref.display(),
            model = %set.model,
            entries = set.len(),
            dimension = set.dimension,
            "Loaded feature set"
        );
        Ok(set)
    }

    /// Write the set as JSON, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatasetError::file_io_error("create feature directory", parent, &e)
                })?;
            }
        }
        let json = serde_json::to_string(self)?;
        std::fs::write(path_ref, json)
            .map_err(|e| DatasetError::file_io_error("write feature file", path_ref, &e))?;
        debug!(path = %path_ref.display(), entries = self.len(), "Saved feature set");
        Ok(())
    }

    /// Every vector must have `dimension` finite components
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 && !self.entries.is_empty() {
            return Err(DatasetError::invalid_feature(format!(
                "feature set '{}' declares dimension 0",
                self.model
            )));
        }
        for entry in &self.entries {
            NumericValidator::validate_dimension(&entry.vector, self.dimension, &entry.path)?;
            NumericValidator::validate_finite_vector(&entry.vector, &entry.path)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Row-per-entry matrix with L2-normalised rows
    ///
    /// Zero vectors stay zero, so they score 0 against everything.
    pub fn matrix(&self) -> Result<Array2<f32>> {
        let flat: Vec<f32> = self
            .entries
            .iter()
            .flat_map(|e| e.vector.iter().copied())
            .collect();
        let mut matrix = Array2::from_shape_vec((self.entries.len(), self.dimension), flat)
            .map_err(|e| DatasetError::invalid_feature(format!("bad feature shape: {}", e)))?;

        for mut row in matrix.rows_mut() {
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_entry_category_from_path() {
        let entry = FeatureEntry::new("cat/n01.jpg", vec![1.0]);
        assert_eq!(entry.category, "cat");
        assert_eq!(entry.file_name(), "n01.jpg");

        let root = FeatureEntry::new("n01.jpg", vec![1.0]);
        assert_eq!(root.category, "");
        assert_eq!(root.file_name(), "n01.jpg");
    }

    #[test]
    fn test_validate_rejects_bad_vectors() {
        let wrong_dim = FeatureSet::from_entries(
            "m",
            vec![
                FeatureEntry::new("a/1.jpg", vec![1.0, 0.0]),
                FeatureEntry::new("a/2.jpg", vec![1.0]),
            ],
        );
        assert!(matches!(wrong_dim, Err(DatasetError::InvalidFeature(_))));

        let nan = FeatureSet::from_entries("m", vec![FeatureEntry::new("a/1.jpg", vec![f32::NAN])]);
        assert!(matches!(nan, Err(DatasetError::InvalidFeature(_))));
    }

    #[test]
    fn test_matrix_rows_are_normalised() {
        let set = FeatureSet::from_entries(
            "m",
            vec![
                FeatureEntry::new("a/1.jpg", vec![3.0, 4.0]),
                FeatureEntry::new("a/2.jpg", vec![0.0, 0.0]),
            ],
        )
        .unwrap();

        let matrix = set.matrix().unwrap();
        assert_eq!(matrix.shape(), &[2, 2]);
        assert!((matrix[[0, 0]] - 0.6).abs() < 1e-6);
        assert!((matrix[[0, 1]] - 0.8).abs() < 1e-6);
        assert_eq!(matrix[[1, 0]], 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("features/photos.json");
        let set = FeatureSet::from_entries(
            "resnet",
            vec![FeatureEntry::new("cat/1.jpg", vec![0.5, 0.25, 1.0])],
        )
        .unwrap();

        set.save(&path).unwrap();
        let loaded = FeatureSet::load(&path).unwrap();
        assert_eq!(loaded, set);
        assert_eq!(loaded.dimension, 3);
    }

    #[test]
    fn test_load_rejects_inconsistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{"model":"m","dimension":3,"entries":[{"path":"a/1.jpg","category":"a","vector":[1.0]}]}"#,
        )
        .unwrap();

        assert!(matches!(
            FeatureSet::load(&path),
            Err(DatasetError::InvalidFeature(_))
        ));
        assert!(FeatureSet::load(temp_dir.path().join("absent.json")).is_err());
    }
}
