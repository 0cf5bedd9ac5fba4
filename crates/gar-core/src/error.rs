//! Error types for archive operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ArchiveError`.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Broad failure class of an [`ArchiveError`].
///
/// Callers that only need to decide *what kind* of thing went wrong (exit
/// codes, user hints) match on this instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The source path is missing or unreadable.
    Input,
    /// Unknown format, corrupt container, or a node the format cannot hold.
    Format,
    /// Key derivation or authentication failure.
    Crypto,
    /// An entry was rejected by the path guard.
    Security,
    /// Filesystem read/write/create failure.
    Io,
    /// The options handed to the operator are invalid.
    Config,
}

/// Errors that can occur while compressing, extracting or listing archives.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Input path cannot be stat'd or opened.
    #[error("cannot access input {path}: {source}")]
    Input {
        /// The path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[source] io::Error),

    /// Archive format is unsupported or unrecognized.
    #[error("unsupported archive format")]
    UnsupportedFormat,

    /// Archive is corrupted or invalid.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// A filesystem node cannot be represented by the container format.
    #[error("cannot archive {path}: {kind} entries are not supported")]
    UnsupportedEntry {
        /// The offending node.
        path: PathBuf,
        /// Human-readable node kind (e.g. "symlink").
        kind: &'static str,
    },

    /// Authenticated decryption failed.
    ///
    /// Raised for a wrong password as well as for tampered or truncated
    /// ciphertext; an AEAD tag failure cannot tell the two apart.
    #[error("decryption failed: wrong password or corrupted archive")]
    Authentication,

    /// Cipher could not be initialised from the derived key.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Path traversal attempt detected.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The entry name that attempted traversal.
        path: PathBuf,
    },

    /// Options are invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// Failure while processing a specific archive entry.
    #[error("entry '{name}': {source}")]
    Entry {
        /// Archive entry name.
        name: String,
        /// The underlying failure.
        #[source]
        source: Box<ArchiveError>,
    },

    /// Failure annotated with the phase in which it happened.
    #[error("{context}: {source}")]
    Context {
        /// Phase description, e.g. "open archive".
        context: String,
        /// The underlying failure.
        #[source]
        source: Box<ArchiveError>,
    },

    /// One or more independent entries failed during parallel extraction.
    #[error("{failed} of {total} entries failed to extract; first failure: {source}")]
    PartialExtraction {
        /// Number of failed entries.
        failed: usize,
        /// Number of entries attempted.
        total: usize,
        /// A representative failure.
        #[source]
        source: Box<ArchiveError>,
    },
}

impl ArchiveError {
    /// Wraps this error with the name of the entry being processed.
    #[must_use]
    pub fn with_entry(self, name: impl Into<String>) -> Self {
        Self::Entry {
            name: name.into(),
            source: Box::new(self),
        }
    }

    /// Wraps this error with a description of the failing phase.
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the failure class, looking through context wrappers.
    ///
    /// # Examples
    ///
    /// ```
    /// use gar_core::ArchiveError;
    /// use gar_core::error::ErrorCategory;
    ///
    /// let err = ArchiveError::Authentication.with_context("open archive");
    /// assert_eq!(err.category(), ErrorCategory::Crypto);
    /// ```
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Input { .. } => ErrorCategory::Input,
            Self::Io(_) => ErrorCategory::Io,
            Self::UnsupportedFormat | Self::InvalidArchive(_) | Self::UnsupportedEntry { .. } => {
                ErrorCategory::Format
            }
            Self::Authentication | Self::KeyDerivation(_) => ErrorCategory::Crypto,
            Self::PathTraversal { .. } => ErrorCategory::Security,
            Self::InvalidConfiguration { .. } => ErrorCategory::Config,
            Self::Entry { source, .. }
            | Self::Context { source, .. }
            | Self::PartialExtraction { source, .. } => source.category(),
        }
    }

    /// Returns `true` if this error represents a path guard rejection.
    ///
    /// # Examples
    ///
    /// ```
    /// use gar_core::ArchiveError;
    /// use std::path::PathBuf;
    ///
    /// let err = ArchiveError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_security_violation());
    /// assert!(!ArchiveError::UnsupportedFormat.is_security_violation());
    /// ```
    #[must_use]
    pub fn is_security_violation(&self) -> bool {
        self.category() == ErrorCategory::Security
    }

    /// Returns `true` if this error is a key derivation or authentication
    /// failure.
    #[must_use]
    pub fn is_crypto_failure(&self) -> bool {
        self.category() == ErrorCategory::Crypto
    }
}

impl From<io::Error> for ArchiveError {
    /// Converts an I/O error, recovering authentication failures that the
    /// decrypting reader had to tunnel through `io::Read`.
    fn from(err: io::Error) -> Self {
        if crate::crypto::is_authentication_failure(&err) {
            Self::Authentication
        } else {
            Self::Io(err)
        }
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io_err) => io_err.into(),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ArchiveError::UnsupportedFormat;
        assert_eq!(err.to_string(), "unsupported archive format");
    }

    #[test]
    fn test_path_traversal_error() {
        let err = ArchiveError::PathTraversal {
            path: PathBuf::from("../etc/passwd"),
        };
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../etc/passwd"));
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ArchiveError = io_err.into();
        assert!(matches!(err, ArchiveError::Io(_)));
        assert_eq!(err.category(), ErrorCategory::Io);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            ArchiveError::InvalidArchive("bad".into()).category(),
            ErrorCategory::Format
        );
        assert_eq!(
            ArchiveError::UnsupportedEntry {
                path: PathBuf::from("fifo"),
                kind: "fifo",
            }
            .category(),
            ErrorCategory::Format
        );
        assert_eq!(
            ArchiveError::KeyDerivation("bad key".into()).category(),
            ErrorCategory::Crypto
        );
        assert_eq!(
            ArchiveError::InvalidConfiguration {
                reason: "zero workers".into()
            }
            .category(),
            ErrorCategory::Config
        );
        assert_eq!(
            ArchiveError::Input {
                path: PathBuf::from("missing"),
                source: io::Error::from(io::ErrorKind::NotFound),
            }
            .category(),
            ErrorCategory::Input
        );
    }

    #[test]
    fn test_wrappers_keep_category() {
        let err = ArchiveError::PathTraversal {
            path: PathBuf::from("../evil.txt"),
        }
        .with_entry("../evil.txt");
        assert!(err.is_security_violation());
        assert!(err.to_string().starts_with("entry '../evil.txt'"));

        let err = ArchiveError::Authentication.with_context("read archive");
        assert!(err.is_crypto_failure());
        assert!(err.to_string().starts_with("read archive: "));

        let err = ArchiveError::PartialExtraction {
            failed: 2,
            total: 5,
            source: Box::new(ArchiveError::Io(io::Error::other("disk full"))),
        };
        assert_eq!(err.category(), ErrorCategory::Io);
        assert!(err.to_string().contains("2 of 5"));
    }

    #[test]
    fn test_zip_error_conversion() {
        let err: ArchiveError =
            zip::result::ZipError::Io(io::Error::from(io::ErrorKind::UnexpectedEof)).into();
        assert!(matches!(err, ArchiveError::Io(_)));

        let err: ArchiveError = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, ArchiveError::InvalidArchive(_)));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err = ArchiveError::Io(io::Error::other("inner")).with_entry("a.txt");
        let source = err.source().expect("entry wrapper should expose a source");
        assert!(source.to_string().contains("inner"));
    }
}
