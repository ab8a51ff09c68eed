// src/recipe/kitchen/files.rs

//! Filesystem operations performed by the Kitchen

use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File effects of the source and package phases
pub trait FileCopier: Send + Sync {
    /// Move a file or directory; the source must exist
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Create or replace a file, creating parent directories
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;

    /// Create a directory and its parents
    fn create_dir(&self, path: &Path) -> Result<()>;

    /// Remove a directory tree; a missing directory is not an error
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Files directly in `dir` whose name matches the glob `pattern`, sorted
    fn find(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>>;

    /// Copy the files matched by [`FileCopier::find`] into `dst_dir`
    ///
    /// Returns the copied destination paths.
    fn copy_matching(&self, src_dir: &Path, pattern: &str, dst_dir: &Path) -> Result<Vec<PathBuf>> {
        let matches = self.find(src_dir, pattern)?;
        let mut copied = Vec::with_capacity(matches.len());
        for src in matches {
            let Some(name) = src.file_name() else {
                continue;
            };
            let dst = dst_dir.join(name);
            self.copy(&src, &dst)?;
            copied.push(dst);
        }
        Ok(copied)
    }

    /// Copy one file, creating parent directories
    fn copy(&self, from: &Path, to: &Path) -> Result<()>;
}

/// The local filesystem
pub struct LocalFiles;

impl FileCopier for LocalFiles {
    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if !from.exists() {
            return Err(Error::NotFound(from.display().to_string()));
        }
        fs::rename(from, to).map_err(|e| {
            Error::IoError(format!(
                "Failed to rename {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        if path.exists() {
            fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    fn find(&self, dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
        let full = format!(
            "{}/{}",
            glob::Pattern::escape(&dir.to_string_lossy()),
            pattern
        );
        let paths = glob::glob(&full)
            .map_err(|e| Error::ParseError(format!("Invalid pattern '{}': {}", pattern, e)))?;

        let mut found = Vec::new();
        for path in paths {
            let path = path.map_err(|e| Error::IoError(e.to_string()))?;
            if !path.is_dir() {
                found.push(path);
            }
        }
        found.sort();
        Ok(found)
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to).map_err(|e| {
            Error::IoError(format!(
                "Failed to copy {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_matching_licenses() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("LICENSE.md"), b"zlib").unwrap();
        fs::write(src.join("README.md"), b"readme").unwrap();

        let dst = dir.path().join("package/licenses");
        let copied = LocalFiles.copy_matching(&src, "LICENSE*", &dst).unwrap();

        assert_eq!(copied, vec![dst.join("LICENSE.md")]);
        assert_eq!(fs::read(dst.join("LICENSE.md")).unwrap(), b"zlib");
        assert!(!dst.join("README.md").exists());
    }

    #[test]
    fn test_find_skips_directories() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("libglfw.3.dylib"), b"").unwrap();
        fs::create_dir(dir.path().join("weird.dylib")).unwrap();

        let found = LocalFiles.find(dir.path(), "*.dylib").unwrap();
        assert_eq!(found, vec![dir.path().join("libglfw.3.dylib")]);
    }

    #[test]
    fn test_remove_missing_dir_is_ok() {
        let dir = TempDir::new().unwrap();
        assert!(LocalFiles.remove_dir(&dir.path().join("lib/cmake")).is_ok());
    }

    #[test]
    fn test_rename_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = LocalFiles.rename(&dir.path().join("glfw-3.3.2"), &dir.path().join("x"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
