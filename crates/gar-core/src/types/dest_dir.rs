//! Validated extraction root.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;

use super::SafePath;

/// Canonical, existing, writable directory that extraction writes into.
///
/// The path is canonicalized once at construction; every entry path is then
/// checked against this canonical form, so a relative root such as `.` is
/// compared by real location rather than by spelling.
///
/// # Examples
///
/// ```no_run
/// use gar_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new(".")?;
/// assert!(dest.as_path().is_absolute());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Validates an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the path does not exist, is not a directory, cannot be
    /// canonicalized, or (on Unix) is not writable by this process.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let metadata = fs::metadata(&path).map_err(|e| {
            ArchiveError::Io(io::Error::new(
                e.kind(),
                format!("cannot access output directory {}: {e}", path.display()),
            ))
        })?;

        if !metadata.is_dir() {
            return Err(ArchiveError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("output path is not a directory: {}", path.display()),
            )));
        }

        let canonical = path.canonicalize().map_err(|e| {
            ArchiveError::Io(io::Error::new(
                e.kind(),
                format!("failed to canonicalize {}: {e}", path.display()),
            ))
        })?;

        check_writable(&canonical)?;

        Ok(Self(canonical))
    }

    /// Creates the directory (and parents) if missing, then validates it.
    ///
    /// # Errors
    ///
    /// Returns `Io` if creation fails or validation fails as in [`Self::new`].
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        fs::create_dir_all(&path).map_err(|e| {
            ArchiveError::Io(io::Error::new(
                e.kind(),
                format!("cannot create output directory {}: {e}", path.display()),
            ))
        })?;
        Self::new(path)
    }

    /// Canonical path of the root.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Resolves a validated entry path under this root.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }
}

#[cfg(unix)]
fn check_writable(path: &Path) -> Result<()> {
    use std::ffi::CString;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        ArchiveError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains null byte",
        ))
    })?;

    // SAFETY: `c_path` is a valid NUL-terminated string that outlives the
    // call; access() only reads it.
    #[allow(unsafe_code)]
    let result = unsafe { libc::access(c_path.as_ptr(), libc::W_OK) };

    if result != 0 {
        return Err(ArchiveError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("output directory is not writable: {}", path.display()),
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn check_writable(path: &Path) -> Result<()> {
    if fs::metadata(path)?.permissions().readonly() {
        return Err(ArchiveError::Io(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("output directory is not writable: {}", path.display()),
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dest_dir_valid() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestDir::new(temp.path()).expect("dest should be valid");
        assert!(dest.as_path().is_absolute());
    }

    #[test]
    fn test_dest_dir_nonexistent() {
        let result = DestDir::new("/nonexistent/directory/that/does/not/exist");
        assert!(matches!(result, Err(ArchiveError::Io(_))));
    }

    #[test]
    fn test_dest_dir_not_a_directory() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file_path = temp.path().join("file.txt");
        fs::write(&file_path, "test").expect("failed to write file");

        assert!(matches!(DestDir::new(file_path), Err(ArchiveError::Io(_))));
    }

    #[test]
    fn test_dest_dir_canonicalization() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let subdir = temp.path().join("subdir");
        fs::create_dir(&subdir).expect("failed to create subdir");

        let dest = DestDir::new(subdir.join(".").join("..")).expect("should create dest dir");
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
    }

    #[test]
    fn test_dest_dir_create_missing() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let nested = temp.path().join("a").join("b");

        let dest = DestDir::create(&nested).expect("should create nested root");
        assert!(nested.is_dir());
        assert_eq!(dest.as_path(), nested.canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn test_dest_dir_resolves_symlink() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().expect("failed to create temp dir");
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).expect("failed to create real dir");
        let link = temp.path().join("link");
        symlink(&real_dir, &link).expect("failed to create symlink");

        let dest = DestDir::new(link).expect("should create from symlink");
        assert_eq!(dest.as_path(), real_dir.canonicalize().unwrap());
    }
}
