//! Filesystem probes used by the classifier and the search.
//!
//! Everything the core reads from disk goes through [`FileSystem`], so tests
//! can count probes or fake a tree without touching the real filesystem.

use std::io;
use std::path::Path;

/// Read-only filesystem access.
pub trait FileSystem: Send + Sync {
    /// Whether `path` is a directory. Fails if `path` cannot be stat'ed.
    fn is_dir(&self, path: &Path) -> io::Result<bool>;

    /// Whether `path` exists. `Ok(false)` for a plain miss, `Err` when the
    /// answer is unknowable (permission denied, symlink loop, ...).
    fn exists(&self, path: &Path) -> io::Result<bool>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        std::fs::metadata(path).map(|meta| meta.is_dir())
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        path.try_exists()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

impl<F: FileSystem + ?Sized> FileSystem for &F {
    fn is_dir(&self, path: &Path) -> io::Result<bool> {
        (**self).is_dir(path)
    }

    fn exists(&self, path: &Path) -> io::Result<bool> {
        (**self).exists(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        (**self).read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_exists_reports_plain_miss_as_false() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!OsFileSystem.exists(&tmp.path().join("missing")).unwrap());
        assert!(OsFileSystem.exists(tmp.path()).unwrap());
    }

    #[test]
    fn test_os_is_dir_fails_for_missing_path() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(OsFileSystem.is_dir(tmp.path()).unwrap());
        assert!(OsFileSystem.is_dir(&tmp.path().join("missing")).is_err());
    }
}
