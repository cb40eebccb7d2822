//! Line-delimited manifests naming the files that belong to the test split

use crate::error::{DatasetError, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

/// Set of relative paths (with `/` separators) that designate the test split
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: BTreeSet<String>,
}

impl Manifest {
    /// Load a manifest from disk
    ///
    /// Every line is trimmed; blank lines are dropped and `\` separators are
    /// rewritten to `/`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let content = std::fs::read_to_string(path_ref)
            .map_err(|e| DatasetError::file_io_error("read manifest", path_ref, &e))?;

        let manifest = Self::parse(&content);
        debug!(
            path = %path_ref.display(),
            entries = manifest.len(),
            "Loaded manifest"
        );
        Ok(manifest)
    }

    /// Load a manifest, treating a missing file as an empty manifest
    ///
    /// A missing manifest only produces a warning so that preparation can
    /// still run; every file then lands in the train split.
    pub fn load_or_empty<P: AsRef<Path>>(path: P, description: &str) -> Result<Self> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            warn!(
                path = %path_ref.display(),
                "{} file list needs to be set; treating it as empty",
                description
            );
            return Ok(Self::default());
        }
        if path_ref.is_dir() {
            return Err(DatasetError::manifest(format!(
                "{} file list '{}' is a directory",
                description,
                path_ref.display()
            )));
        }
        Self::load(path_ref)
    }

    /// Parse manifest content
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.replace('\\', "/"))
            .collect();
        Self { entries }
    }

    /// Build a manifest from relative paths
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = paths
            .into_iter()
            .map(|p| p.as_ref().trim().replace('\\', "/"))
            .filter(|p| !p.is_empty())
            .collect();
        Self { entries }
    }

    /// Whether `relative_path` is listed
    #[must_use]
    pub fn contains(&self, relative_path: &str) -> bool {
        self.entries.contains(relative_path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in sorted order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let manifest = Manifest::parse("airplane/a.jpg\n\n  cat/b.jpg  \r\n\t\nzebra\\c.jpg\n");
        assert_eq!(manifest.len(), 3);
        assert!(manifest.contains("airplane/a.jpg"));
        assert!(manifest.contains("cat/b.jpg"));
        assert!(manifest.contains("zebra/c.jpg"));
        assert!(!manifest.contains("  cat/b.jpg  "));
    }

    #[test]
    fn test_duplicates_collapse() {
        let manifest = Manifest::parse("a/x.jpg\na/x.jpg\n");
        assert_eq!(manifest.len(), 1);
    }

    #[test]
    fn test_iter_is_sorted() {
        let manifest = Manifest::from_paths(["z/1.jpg", "a/2.jpg", "m/3.jpg"]);
        let entries: Vec<_> = manifest.iter().collect();
        assert_eq!(entries, vec!["a/2.jpg", "m/3.jpg", "z/1.jpg"]);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test_img.txt");
        std::fs::write(&path, "cat/1.jpg\ndog/2.jpg\n").unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.len(), 2);
        assert!(manifest.contains("dog/2.jpg"));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let err = Manifest::load(temp_dir.path().join("nope.txt")).unwrap_err();
        assert!(err.to_string().contains("read manifest"));
    }

    #[test]
    fn test_load_or_empty_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let manifest =
            Manifest::load_or_empty(temp_dir.path().join("nope.txt"), "test photo").unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_load_or_empty_rejects_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = Manifest::load_or_empty(temp_dir.path(), "test sketch");
        assert!(matches!(result, Err(DatasetError::ManifestParse(_))));
    }
}
