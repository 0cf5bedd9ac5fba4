//! Archive entry kind.

use std::fmt;

/// Kind of an archive entry.
///
/// Only regular files and directories are written, on either side: other
/// node types are refused at encode time, and archive entries of those types
/// are listed but skipped on extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// Regular file with content.
    File,
    /// Directory; carries no content.
    Directory,
    /// Symlink, hard link, device or FIFO, named by its label.
    Special(&'static str),
}

impl EntryKind {
    /// Returns `true` if this is a regular file.
    #[must_use]
    pub const fn is_file(self) -> bool {
        matches!(self, Self::File)
    }

    /// Returns `true` if this is a directory.
    #[must_use]
    pub const fn is_directory(self) -> bool {
        matches!(self, Self::Directory)
    }

    /// Returns `true` for entries that are never written to disk.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Special(_))
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "dir",
            Self::Special(label) => *label,
        })
    }
}
