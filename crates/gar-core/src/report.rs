//! Operation reports.

use std::time::Duration;

use crate::types::EntryKind;

/// Report of a compress operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressionReport {
    /// Number of file entries written.
    pub files_added: usize,

    /// Number of directory entries written.
    pub directories_added: usize,

    /// Total uncompressed bytes read from the input tree.
    pub bytes_read: u64,

    /// Size of the produced archive, including the encryption header and
    /// framing when a password is set.
    pub archive_bytes: u64,

    /// Wall-clock duration of the operation.
    pub duration: Duration,
}

impl CompressionReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries written.
    #[must_use]
    pub fn total_entries(&self) -> usize {
        self.files_added + self.directories_added
    }

    /// Archive size relative to input size (0.0 for an empty input).
    #[must_use]
    pub fn compression_ratio(&self) -> f64 {
        if self.bytes_read == 0 {
            return 0.0;
        }
        self.archive_bytes as f64 / self.bytes_read as f64
    }
}

/// Report of an extract operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directories created.
    pub directories_created: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Links, devices and FIFOs that were left out.
    pub entries_skipped: usize,

    /// Wall-clock duration of the operation.
    pub duration: Duration,
}

impl ExtractionReport {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns total number of items extracted.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }
}

/// One line of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    /// Entry name as stored, forward-slash separated.
    pub name: String,

    /// Uncompressed size in bytes (0 for directories).
    pub size: u64,

    /// File or directory.
    pub kind: EntryKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_reports_are_empty() {
        let report = ExtractionReport::new();
        assert_eq!(report.total_items(), 0);
        assert_eq!(report.bytes_written, 0);

        let report = CompressionReport::new();
        assert_eq!(report.total_entries(), 0);
        assert!(report.compression_ratio().abs() < f64::EPSILON);
    }

    #[test]
    fn test_compression_ratio() {
        let report = CompressionReport {
            files_added: 1,
            bytes_read: 200,
            archive_bytes: 50,
            ..CompressionReport::default()
        };
        assert!((report.compression_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
