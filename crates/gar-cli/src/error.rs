//! Error conversion utilities for CLI.
//!
//! Converts gar-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use gar_core::ArchiveError;
use gar_core::ErrorCategory;
use std::path::Path;

/// Converts `ArchiveError` to a user-friendly anyhow error with a hint.
pub fn convert_error(err: ArchiveError, archive: &Path) -> anyhow::Error {
    let hint = match err.category() {
        ErrorCategory::Input => "Check that the path exists and is readable.",
        ErrorCategory::Format => {
            "The archive may be corrupted, or it was encrypted and needs --password. \
             Supported formats: zip, tar.gz"
        }
        ErrorCategory::Crypto => {
            "Wrong password, or the archive was modified after it was written."
        }
        ErrorCategory::Security => {
            "This archive may be malicious. Do not extract from untrusted sources."
        }
        ErrorCategory::Io => "Check free disk space and permissions on the output location.",
        ErrorCategory::Config => "Run with --help to see accepted values.",
    };

    let headline = match err.category() {
        ErrorCategory::Security => "Security violation",
        ErrorCategory::Crypto => "Decryption failed",
        _ => "Error",
    };

    anyhow!(
        "{headline} while processing '{}': {err}\nHINT: {hint}",
        archive.display()
    )
}

/// Converts the error of a core call, naming `archive` in the message.
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_error(e, archive))
}
