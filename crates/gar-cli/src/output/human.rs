//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use gar_core::ArchiveFormat;
use gar_core::CompressionReport;
use gar_core::EntryKind;
use gar_core::ExtractionReport;
use gar_core::ListedEntry;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();

        for (count, c) in s.chars().rev().enumerate() {
            if count > 0 && count % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result.chars().rev().collect()
    }

    fn headline(&self, message: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(message);
        }
    }

    fn listing_line(entry: &ListedEntry, human_readable: bool) -> String {
        let size = match entry.kind {
            EntryKind::Directory => "-".to_string(),
            EntryKind::File if human_readable => Self::format_size(entry.size),
            EntryKind::File => entry.size.to_string(),
            EntryKind::Special(label) => label.to_string(),
        };
        format!("{size:>12}  {}", entry.name)
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_compression_result(
        &self,
        output_path: &Path,
        format: ArchiveFormat,
        report: &CompressionReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!(
            "Archive created: {} ({format})",
            output_path.display()
        ));
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_read)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.archive_bytes)
        ));

        if self.verbose {
            let _ = self.term.write_line(&format!(
                "  Ratio:            {:.1}%",
                report.compression_ratio() * 100.0
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:.2?}", report.duration));
        }

        Ok(())
    }

    fn format_extraction_result(&self, output_dir: &Path, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Extracted to {}", output_dir.display()));
        let _ = self.term.write_line(&format!(
            "  Files extracted:  {}",
            Self::format_number(report.files_extracted)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_created)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        if report.entries_skipped > 0 {
            let _ = self.term.write_line(&format!(
                "  Skipped:          {} (links, devices, FIFOs)",
                Self::format_number(report.entries_skipped)
            ));
        }

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:.2?}", report.duration));
        }

        Ok(())
    }

    fn format_listing(
        &self,
        _archive: &Path,
        entries: &[ListedEntry],
        human_readable: bool,
    ) -> Result<()> {
        for entry in entries {
            let _ = self
                .term
                .write_line(&Self::listing_line(entry, human_readable));
        }

        if self.quiet {
            return Ok(());
        }

        let files = entries.iter().filter(|e| e.kind.is_file()).count();
        let total: u64 = entries.iter().map(|e| e.size).sum();
        let _ = self.term.write_line(&format!(
            "Total: {} files, {}",
            Self::format_number(files),
            Self::format_size(total)
        ));

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if console::colors_enabled_stderr() {
            let _ = term.write_line(&format!("{} {error:#}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:#}"));
        }
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let term = Term::stderr();
        if console::colors_enabled_stderr() {
            let _ = term.write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = term.write_line(&format!("WARNING: {message}"));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(HumanFormatter::format_size(0), "0 B");
        assert_eq!(HumanFormatter::format_size(512), "512 B");
        assert_eq!(HumanFormatter::format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(HumanFormatter::format_size(1536), "1.5 KB");
        assert_eq!(HumanFormatter::format_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(HumanFormatter::format_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(999), "999");
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_listing_line() {
        let file = ListedEntry {
            name: "a/b.txt".to_string(),
            size: 2048,
            kind: EntryKind::File,
        };
        let dir = ListedEntry {
            name: "a/".to_string(),
            size: 0,
            kind: EntryKind::Directory,
        };

        assert_eq!(HumanFormatter::listing_line(&file, false), "        2048  a/b.txt");
        assert_eq!(HumanFormatter::listing_line(&file, true), "      2.0 KB  a/b.txt");
        assert_eq!(HumanFormatter::listing_line(&dir, false), "           -  a/");
    }

    #[test]
    fn test_listing_line_names_special_entries() {
        let link = ListedEntry {
            name: "link".to_string(),
            size: 5,
            kind: EntryKind::Special("symlink"),
        };

        assert_eq!(HumanFormatter::listing_line(&link, false), "     symlink  link");
        assert_eq!(HumanFormatter::listing_line(&link, true), "     symlink  link");
    }
}
