//! Path validation utilities
//!
//! Provides centralized validation for source roots and file names.

use crate::error::{DatasetError, Result};
use std::path::{Path, PathBuf};

/// Validator for file system paths
pub struct PathValidator;

impl PathValidator {
    /// Validate that a source root exists and is a directory
    pub fn validate_source_root<P: AsRef<Path>>(path: P) -> Result<()> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(DatasetError::SourceNotFound(path_ref.to_path_buf()));
        }

        if !path_ref.is_dir() {
            return Err(DatasetError::invalid_config(format!(
                "Path is not a directory: {}",
                path_ref.display()
            )));
        }
        Ok(())
    }

    /// Validate that a target root is not an existing regular file
    pub fn validate_target_root<P: AsRef<Path>>(path: P) -> Result<()> {
        let path_ref = path.as_ref();
        if path_ref.is_file() {
            return Err(DatasetError::invalid_config(format!(
                "Target path exists and is a file, not a directory: {}",
                path_ref.display()
            )));
        }
        Ok(())
    }

    /// Check whether a file name is hidden (dot-file)
    pub fn is_hidden_name(file_name: &str) -> bool {
        file_name.starts_with('.')
    }

    /// Check whether `child` lies inside `parent` (or is `parent`)
    ///
    /// Both paths are made absolute and their existing prefixes canonicalised,
    /// so `.` and symlinked roots compare by location.
    pub fn is_nested<P: AsRef<Path>, Q: AsRef<Path>>(child: P, parent: Q) -> bool {
        Self::resolve(child.as_ref()).starts_with(Self::resolve(parent.as_ref()))
    }

    /// Absolute form of `path` with its longest existing ancestor canonicalised
    fn resolve(path: &Path) -> PathBuf {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf())
        };

        let mut existing = absolute.as_path();
        let mut missing = Vec::new();
        loop {
            if let Ok(canonical) = existing.canonicalize() {
                return missing
                    .iter()
                    .rev()
                    .fold(canonical, |resolved, part| resolved.join(part));
            }
            match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    existing = parent;
                }
                _ => return absolute,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_source_root() {
        let temp_dir = TempDir::new().unwrap();
        assert!(PathValidator::validate_source_root(temp_dir.path()).is_ok());

        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            PathValidator::validate_source_root(&missing),
            Err(DatasetError::SourceNotFound(_))
        ));

        let file = temp_dir.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            PathValidator::validate_source_root(&file),
            Err(DatasetError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_target_root() {
        let temp_dir = TempDir::new().unwrap();
        assert!(PathValidator::validate_target_root(temp_dir.path()).is_ok());
        assert!(PathValidator::validate_target_root(temp_dir.path().join("new")).is_ok());

        let file = temp_dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        assert!(PathValidator::validate_target_root(&file).is_err());
    }

    #[test]
    fn test_hidden_and_nested() {
        assert!(PathValidator::is_hidden_name(".DS_Store"));
        assert!(!PathValidator::is_hidden_name("cat.jpg"));

        assert!(PathValidator::is_nested("/data/dataset/photo", "/data/dataset"));
        assert!(!PathValidator::is_nested("/data/other", "/data/dataset"));
        assert!(!PathValidator::is_nested("/data/dataset2", "/data/dataset"));
    }

    #[test]
    fn test_nested_resolves_existing_paths() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source");
        std::fs::create_dir_all(source.join("photo")).unwrap();

        // `..` through an existing directory
        let roundabout = source.join("photo").join("..").join("photo");
        assert!(PathValidator::is_nested(&roundabout, &source));
        // a not-yet-created target under an existing root
        assert!(PathValidator::is_nested(source.join("new/dataset"), &source));

        let cwd = std::env::current_dir().unwrap();
        assert!(PathValidator::is_nested("dataset", "."));
        assert!(PathValidator::is_nested(&cwd, "."));
    }
}
