//! Deterministic input tree traversal.

use std::fs;
use std::fs::FileType;
use std::fs::Metadata;
use std::io;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use walkdir::WalkDir;

use crate::ArchiveError;
use crate::Result;
use crate::types::EntryKind;

/// A filesystem node about to be written into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Full filesystem path of the node.
    pub path: PathBuf,

    /// Archive name: relative to the walk root, `/`-separated, no trailing
    /// slash (the codec adds one for directories where its format wants it).
    pub name: String,

    /// File or directory.
    pub kind: EntryKind,

    /// Size in bytes (0 for directories).
    pub size: u64,

    /// Permission bits to record.
    pub mode: u32,
}

/// Walks an input path in a stable order.
///
/// A directory root yields every descendant, sorted by file name at each
/// level, parents before children; the root itself is not yielded. A file
/// root yields exactly one entry named by its base name. Symlinks are never
/// followed below the root.
///
/// # Examples
///
/// ```no_run
/// use gar_core::creation::TreeWalker;
/// use std::path::Path;
///
/// # fn main() -> gar_core::Result<()> {
/// for entry in TreeWalker::new(Path::new("./project"))?.walk() {
///     let entry = entry?;
///     println!("{} {}", entry.kind, entry.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TreeWalker {
    root: PathBuf,
    root_is_dir: bool,
    exclude: Option<PathBuf>,
}

impl TreeWalker {
    /// Stats the root.
    ///
    /// # Errors
    ///
    /// Returns `Input` if the root does not exist or cannot be stat'd.
    pub fn new(root: &Path) -> Result<Self> {
        let metadata = fs::metadata(root).map_err(|source| ArchiveError::Input {
            path: root.to_path_buf(),
            source,
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            root_is_dir: metadata.is_dir(),
            exclude: None,
        })
    }

    /// Skips `path` during the walk, so an archive written inside its own
    /// input tree does not try to contain itself.
    ///
    /// `path` must already exist; a path that cannot be resolved is ignored.
    #[must_use]
    pub fn excluding(mut self, path: &Path) -> Self {
        self.exclude = fs::canonicalize(path).ok();
        self
    }

    /// Returns `true` if the root is a directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.root_is_dir
    }

    /// Iterates over the entries in archive order.
    ///
    /// Each item fails independently with `Io` for unreadable nodes and
    /// `UnsupportedEntry` for symlinks, sockets, FIFOs and devices.
    pub fn walk(&self) -> impl Iterator<Item = Result<SourceEntry>> + '_ {
        let min_depth = usize::from(self.root_is_dir);

        WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(min_depth)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry.path()))
            .map(move |entry| -> Result<SourceEntry> {
                let entry = entry.map_err(walk_error)?;
                self.build_entry(&entry)
            })
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.as_ref().is_some_and(|excluded| {
            excluded.file_name() == path.file_name()
                && fs::canonicalize(path).is_ok_and(|resolved| &resolved == excluded)
        })
    }

    fn build_entry(&self, entry: &walkdir::DirEntry) -> Result<SourceEntry> {
        let path = entry.path();
        let kind = classify(entry.file_type(), path)?;
        let metadata = entry.metadata().map_err(walk_error)?;

        let name = if self.root_is_dir {
            let relative = path.strip_prefix(&self.root).map_err(|_| {
                ArchiveError::Io(io::Error::other(format!(
                    "{} is not below {}",
                    path.display(),
                    self.root.display()
                )))
            })?;
            archive_name(relative, path)?
        } else {
            let base = path
                .file_name()
                .ok_or_else(|| ArchiveError::Input {
                    path: path.to_path_buf(),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
                })?;
            archive_name(Path::new(base), path)?
        };

        Ok(SourceEntry {
            path: path.to_path_buf(),
            name,
            kind,
            size: if kind.is_file() { metadata.len() } else { 0 },
            mode: mode_of(&metadata, kind),
        })
    }
}

/// Joins the normal components of `relative` with `/`.
fn archive_name(relative: &Path, full: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| ArchiveError::UnsupportedEntry {
                path: full.to_path_buf(),
                kind: "non-UTF-8 named",
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

fn classify(file_type: FileType, path: &Path) -> Result<EntryKind> {
    if file_type.is_dir() {
        return Ok(EntryKind::Directory);
    }
    if file_type.is_file() {
        return Ok(EntryKind::File);
    }

    Err(ArchiveError::UnsupportedEntry {
        path: path.to_path_buf(),
        kind: special_kind(file_type),
    })
}

#[cfg(unix)]
fn special_kind(file_type: FileType) -> &'static str {
    use std::os::unix::fs::FileTypeExt;

    if file_type.is_symlink() {
        "symlink"
    } else if file_type.is_fifo() {
        "fifo"
    } else if file_type.is_socket() {
        "socket"
    } else if file_type.is_block_device() || file_type.is_char_device() {
        "device"
    } else {
        "special"
    }
}

#[cfg(not(unix))]
fn special_kind(file_type: FileType) -> &'static str {
    if file_type.is_symlink() {
        "symlink"
    } else {
        "special"
    }
}

#[cfg(unix)]
fn mode_of(metadata: &Metadata, _kind: EntryKind) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_of(metadata: &Metadata, kind: EntryKind) -> u32 {
    match (kind, metadata.permissions().readonly()) {
        (EntryKind::Directory, _) => 0o755,
        (_, true) => 0o444,
        (_, false) => 0o644,
    }
}

fn walk_error(err: walkdir::Error) -> ArchiveError {
    let kind = err.io_error().map_or(io::ErrorKind::Other, io::Error::kind);
    ArchiveError::Io(io::Error::new(kind, err.to_string()))
}
