//! File system operations service
//!
//! This module separates directory walking, copying and moving from the
//! split/reconcile logic, making those stages testable on temp trees.

use crate::error::{DatasetError, Result};
use crate::utils::PathValidator;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file found under a walked root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    /// Absolute (or root-joined) path of the file
    pub path: PathBuf,
    /// Path relative to the walked root
    pub relative: PathBuf,
}

/// Filter deciding which regular files a walk yields
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pattern: Option<glob::Pattern>,
    skip_hidden: bool,
}

impl FileFilter {
    /// Accept every regular file
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from an optional glob on file names
    pub fn new(pattern: Option<&str>, skip_hidden: bool) -> Result<Self> {
        let pattern = pattern
            .map(|pat| {
                glob::Pattern::new(pat).map_err(|e| {
                    DatasetError::invalid_config(format!("Invalid file pattern '{}': {}", pat, e))
                })
            })
            .transpose()?;
        Ok(Self {
            pattern,
            skip_hidden,
        })
    }

    /// Check whether a file name passes the filter
    #[must_use]
    pub fn matches(&self, file_name: &str) -> bool {
        if self.skip_hidden && PathValidator::is_hidden_name(file_name) {
            return false;
        }
        match &self.pattern {
            Some(pattern) => pattern.matches(file_name),
            None => true,
        }
    }
}

/// Service for walking, copying and moving dataset files
pub struct FileTransferService;

impl FileTransferService {
    /// Recursively list regular files under `root` in file-name order
    pub fn collect_files(root: &Path, filter: &FileFilter) -> Result<Vec<WalkedFile>> {
        PathValidator::validate_source_root(root)?;

        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !filter.matches(&name) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .map_err(|_| {
                    DatasetError::invalid_config(format!(
                        "Walked path '{}' is outside of '{}'",
                        entry.path().display(),
                        root.display()
                    ))
                })?
                .to_path_buf();
            files.push(WalkedFile {
                path: entry.path().to_path_buf(),
                relative,
            });
        }
        Ok(files)
    }

    /// List file names directly inside `dir`, sorted
    ///
    /// A missing directory yields an empty list.
    pub fn list_file_names(dir: &Path) -> Result<Vec<String>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)
            .map_err(|e| DatasetError::file_io_error("list directory", dir, &e))?
        {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Copy a file, creating parent directories and keeping its modification time
    pub fn copy_preserving(src: &Path, dest: &Path) -> Result<()> {
        Self::ensure_parent(dest)?;

        std::fs::copy(src, dest).map_err(|e| DatasetError::file_io_error("copy file", src, &e))?;

        let modified = std::fs::metadata(src).and_then(|m| m.modified());
        match modified {
            Ok(mtime) => {
                let applied = std::fs::OpenOptions::new()
                    .write(true)
                    .open(dest)
                    .and_then(|file| file.set_modified(mtime));
                if let Err(e) = applied {
                    tracing::debug!(
                        path = %dest.display(),
                        error = %e,
                        "Could not carry over modification time"
                    );
                }
            },
            Err(e) => {
                tracing::debug!(path = %src.display(), error = %e, "Source has no modification time");
            },
        }
        Ok(())
    }

    /// Move a file, creating parent directories
    ///
    /// Falls back to copy + remove when a rename is not possible (for example
    /// across file systems).
    pub fn move_file(src: &Path, dest: &Path) -> Result<()> {
        Self::ensure_parent(dest)?;

        if let Err(rename_err) = std::fs::rename(src, dest) {
            tracing::debug!(
                from = %src.display(),
                to = %dest.display(),
                error = %rename_err,
                "Rename failed, falling back to copy and remove"
            );
            Self::copy_preserving(src, dest)?;
            std::fs::remove_file(src)
                .map_err(|e| DatasetError::file_io_error("remove moved file", src, &e))?;
        }
        Ok(())
    }

    fn ensure_parent(dest: &Path) -> Result<()> {
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| DatasetError::file_io_error("create output directory", parent, &e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_filter() {
        let filter = FileFilter::all();
        assert!(filter.matches("a.jpg"));
        assert!(filter.matches(".DS_Store"));

        let filter = FileFilter::new(Some("*.jpg"), true).unwrap();
        assert!(filter.matches("a.jpg"));
        assert!(!filter.matches("a.png"));
        assert!(!filter.matches(".hidden.jpg"));

        assert!(FileFilter::new(Some("["), false).is_err());
    }

    #[test]
    fn test_collect_files_recursive_sorted() {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("zebra")).unwrap();
        fs::create_dir_all(root.join("airplane/nested")).unwrap();
        fs::write(root.join("zebra/b.jpg"), b"x").unwrap();
        fs::write(root.join("zebra/a.jpg"), b"x").unwrap();
        fs::write(root.join("airplane/nested/deep.jpg"), b"x").unwrap();
        fs::write(root.join("top.jpg"), b"x").unwrap();

        let files = FileTransferService::collect_files(root, &FileFilter::all()).unwrap();
        let rels: Vec<String> = files
            .iter()
            .map(|f| crate::types::relative_key(&f.relative))
            .collect();

        assert_eq!(
            rels,
            vec!["airplane/nested/deep.jpg", "top.jpg", "zebra/a.jpg", "zebra/b.jpg"]
        );
    }

    #[test]
    fn test_collect_files_missing_root() {
        let temp_dir = tempdir().unwrap();
        let result = FileTransferService::collect_files(&temp_dir.path().join("x"), &FileFilter::all());
        assert!(matches!(result, Err(DatasetError::SourceNotFound(_))));
    }

    #[test]
    fn test_list_file_names() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("b-1.png"), b"x").unwrap();
        fs::write(temp_dir.path().join("a-1.png"), b"x").unwrap();
        fs::create_dir(temp_dir.path().join("subdir")).unwrap();

        let names = FileTransferService::list_file_names(temp_dir.path()).unwrap();
        assert_eq!(names, vec!["a-1.png", "b-1.png"]);

        let missing = FileTransferService::list_file_names(&temp_dir.path().join("nope")).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn test_copy_preserving_creates_parents() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("src.jpg");
        fs::write(&src, b"photo-bytes").unwrap();
        let dest = temp_dir.path().join("out/cat/src.jpg");

        FileTransferService::copy_preserving(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"photo-bytes");
        assert!(src.exists());

        let src_mtime = fs::metadata(&src).unwrap().modified().unwrap();
        let dest_mtime = fs::metadata(&dest).unwrap().modified().unwrap();
        assert_eq!(src_mtime, dest_mtime);
    }

    #[test]
    fn test_move_file() {
        let temp_dir = tempdir().unwrap();
        let src = temp_dir.path().join("a/x.jpg");
        fs::create_dir_all(src.parent().unwrap()).unwrap();
        fs::write(&src, b"x").unwrap();
        let dest = temp_dir.path().join("b/c/x.jpg");

        FileTransferService::move_file(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"x");
    }
}
