//! Output formatter trait for CLI results.

use anyhow::Result;
use gar_core::ArchiveFormat;
use gar_core::CompressionReport;
use gar_core::ExtractionReport;
use gar_core::ListedEntry;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format compression result
    fn format_compression_result(
        &self,
        output_path: &Path,
        format: ArchiveFormat,
        report: &CompressionReport,
    ) -> Result<()>;

    /// Format extraction result
    fn format_extraction_result(&self, output_dir: &Path, report: &ExtractionReport) -> Result<()>;

    /// Format archive listing
    fn format_listing(
        &self,
        archive: &Path,
        entries: &[ListedEntry],
        human_readable: bool,
    ) -> Result<()>;

    /// Format error message for a failed `operation`
    fn format_error(&self, operation: &str, error: &anyhow::Error);

    /// Format warning message
    fn format_warning(&self, message: &str);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
