//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use gar_core::ArchiveFormat;
use gar_core::CompressionReport;
use gar_core::ExtractionReport;
use gar_core::ListedEntry;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ListedEntryOutput<'a> {
    name: &'a str,
    size: u64,
    kind: String,
}

#[derive(Serialize)]
struct ListingOutput<'a> {
    archive: String,
    total_entries: usize,
    total_size: u64,
    entries: Vec<ListedEntryOutput<'a>>,
}

fn listing_output<'a>(archive: &Path, entries: &'a [ListedEntry]) -> ListingOutput<'a> {
    ListingOutput {
        archive: archive.display().to_string(),
        total_entries: entries.len(),
        total_size: entries.iter().map(|e| e.size).sum(),
        entries: entries
            .iter()
            .map(|e| ListedEntryOutput {
                name: &e.name,
                size: e.size,
                kind: e.kind.to_string(),
            })
            .collect(),
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_compression_result(
        &self,
        output_path: &Path,
        format: ArchiveFormat,
        report: &CompressionReport,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct CompressionOutput {
            output_path: String,
            format: String,
            files_added: usize,
            directories_added: usize,
            bytes_read: u64,
            archive_bytes: u64,
            compression_ratio: f64,
            duration_ms: u128,
        }

        let data = CompressionOutput {
            output_path: output_path.display().to_string(),
            format: format.to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            bytes_read: report.bytes_read,
            archive_bytes: report.archive_bytes,
            compression_ratio: report.compression_ratio(),
            duration_ms: report.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("compress", data))
    }

    fn format_extraction_result(&self, output_dir: &Path, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput {
            output_dir: String,
            files_extracted: usize,
            directories_created: usize,
            bytes_written: u64,
            entries_skipped: usize,
            duration_ms: u128,
        }

        let data = ExtractionOutput {
            output_dir: output_dir.display().to_string(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            bytes_written: report.bytes_written,
            entries_skipped: report.entries_skipped,
            duration_ms: report.duration.as_millis(),
        };

        Self::output(&JsonOutput::success("extract", data))
    }

    fn format_listing(
        &self,
        archive: &Path,
        entries: &[ListedEntry],
        _human_readable: bool,
    ) -> Result<()> {
        Self::output(&JsonOutput::success("list", listing_output(archive, entries)))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        // stdout carries exactly one JSON document
        log::warn!("{message}");
    }
}
