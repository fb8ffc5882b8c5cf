//! In-memory mock filesystem for testing the scan without a real
//! database storage directory.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::collector::traits::FileSystem;

/// In-memory filesystem for testing.
///
/// Stores file and directory paths in memory, allowing tests to lay out
/// arbitrary storage-directory states without touching disk.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// File paths.
    files: HashSet<PathBuf>,
    /// Directory paths (for read_dir support).
    directories: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();

        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        self.files.insert(path);
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();

        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }

        self.directories.insert(path);
    }
}

impl FileSystem for MockFs {
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let mut entries: Vec<PathBuf> = self
            .files
            .iter()
            .chain(self.directories.iter())
            .filter(|p| p.parent().is_some_and(|parent| parent == path))
            .cloned()
            .collect();
        entries.sort();
        Ok(entries)
    }
}
