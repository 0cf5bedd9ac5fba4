//! Zip-slip protection.

use std::path::Path;
use std::path::PathBuf;

use crate::Result;
use crate::types::DestDir;
use crate::types::SafePath;

/// Validates an entry name against an extraction root.
///
/// Thin wrapper over [`SafePath::validate`].
///
/// # Errors
///
/// Returns `PathTraversal` for `..` segments, absolute paths, null bytes or
/// any name resolving outside `dest`.
///
/// # Examples
///
/// ```no_run
/// use gar_core::security::validate_path;
/// use gar_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::new("/tmp/out")?;
///
/// assert!(validate_path(&dest, "foo/bar.txt").is_ok());
/// assert!(validate_path(&dest, "../etc/passwd").is_err());
/// # Ok(())
/// # }
/// ```
pub fn validate_path(dest: &DestDir, entry_name: &str) -> Result<SafePath> {
    SafePath::validate(Path::new(entry_name), dest)
}

/// Path guard bound to one extraction root.
///
/// Every entry of every format passes through [`PathGuard::resolve`] before
/// anything is written. The guard only reads the filesystem, so one instance
/// is shared by all extraction workers.
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: DestDir,
}

impl PathGuard {
    /// Binds a guard to a validated root.
    #[must_use]
    pub fn new(root: DestDir) -> Self {
        Self { root }
    }

    /// The canonical extraction root.
    #[must_use]
    pub fn root(&self) -> &DestDir {
        &self.root
    }

    /// Validates `entry_name` and returns the absolute destination path.
    ///
    /// # Errors
    ///
    /// See [`validate_path`].
    pub fn resolve(&self, entry_name: &str) -> Result<PathBuf> {
        let safe = validate_path(&self.root, entry_name)?;
        Ok(self.root.join(&safe))
    }
}
