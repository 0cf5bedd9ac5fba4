//! Validated entry path.

use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;

use super::DestDir;

/// Relative entry path proven to stay inside a [`DestDir`].
///
/// The stored path has no root, prefix, `..` or `.` components. It can only
/// be obtained from [`SafePath::validate`]; there is no `From<PathBuf>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates an archive entry name against an extraction root.
    ///
    /// Steps:
    /// 1. reject null bytes;
    /// 2. reject absolute paths, drive prefixes and any `..` component;
    /// 3. drop `.` components;
    /// 4. join onto the canonical root and canonicalize the deepest existing
    ///    ancestor of the result, so a symlink already present under the
    ///    root cannot redirect the write;
    /// 5. require that ancestor to be the root or below it, compared
    ///    component-wise (`/out` never accepts `/outside`).
    ///
    /// An entry that normalizes to nothing (such as `./`) resolves to the
    /// root itself.
    ///
    /// # Errors
    ///
    /// Returns `PathTraversal` naming the entry when any check fails, or `Io`
    /// if an existing ancestor cannot be canonicalized.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use gar_core::types::DestDir;
    /// use gar_core::types::SafePath;
    /// use std::path::Path;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let dest = DestDir::new("/tmp/out")?;
    ///
    /// let safe = SafePath::validate(Path::new("./docs/a.txt"), &dest)?;
    /// assert_eq!(safe.as_path(), Path::new("docs/a.txt"));
    ///
    /// assert!(SafePath::validate(Path::new("../evil.txt"), &dest).is_err());
    /// assert!(SafePath::validate(Path::new("/etc/passwd"), &dest).is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn validate(path: &Path, dest: &DestDir) -> Result<Self> {
        if has_null_bytes(path) {
            return Err(traversal(path));
        }

        let mut normalized = PathBuf::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(traversal(path));
                }
            }
        }

        let resolved = dest.as_path().join(&normalized);
        let anchor = canonical_ancestor(&resolved)?;
        if !anchor.starts_with(dest.as_path()) {
            return Err(traversal(path));
        }

        Ok(Self(normalized))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Returns `true` if the path resolves to the root itself.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.as_os_str().is_empty()
    }
}

fn traversal(path: &Path) -> ArchiveError {
    ArchiveError::PathTraversal {
        path: path.to_path_buf(),
    }
}

/// Canonical form of the deepest ancestor of `path` (itself included) that
/// exists.
fn canonical_ancestor(path: &Path) -> Result<PathBuf> {
    for ancestor in path.ancestors() {
        match ancestor.canonicalize() {
            Ok(canonical) => return Ok(canonical),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ArchiveError::Io(io::Error::new(
                    e.kind(),
                    format!("failed to canonicalize {}: {e}", ancestor.display()),
                )));
            }
        }
    }

    Err(ArchiveError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no existing ancestor for {}", path.display()),
    )))
}

#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}
