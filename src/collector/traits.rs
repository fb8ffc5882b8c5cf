//! Filesystem abstraction for the storage-directory scan.
//!
//! The `FileSystem` trait lets the collector walk a real database storage
//! directory in production and an in-memory layout in tests.

use std::io;
use std::path::{Path, PathBuf};

/// Abstraction over the one directory operation the scan needs.
pub trait FileSystem {
    /// Lists entries in a directory.
    ///
    /// # Arguments
    /// * `path` - Path to the directory
    ///
    /// # Returns
    /// A vector of paths to entries in the directory, or an I/O error.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_real_fs_read_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("16401"), b"").unwrap();
        std::fs::write(dir.path().join("16402"), b"").unwrap();

        let fs = RealFs::new();
        let mut entries = fs.read_dir(dir.path()).unwrap();
        entries.sort();
        assert_eq!(
            entries,
            vec![dir.path().join("16401"), dir.path().join("16402")]
        );
    }

    #[test]
    fn test_real_fs_read_dir_missing() {
        let fs = RealFs::new();
        assert!(fs.read_dir(Path::new("/nonexistent/path/12345")).is_err());
    }
}
