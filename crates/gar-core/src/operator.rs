//! Top-level orchestration of compress, extract and list.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::info;

use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::ArchiveOptions;
use crate::Result;
use crate::copy::COPY_BUFFER_SIZE;
use crate::creation::TreeWalker;
use crate::crypto::EncryptingWriter;
use crate::formats::ArchiveSource;
use crate::formats::codec_for;
use crate::io::CountingWriter;
use crate::report::CompressionReport;
use crate::report::ExtractionReport;
use crate::report::ListedEntry;
use crate::security::PathGuard;
use crate::types::DestDir;

/// Runs archive operations with one fixed set of options.
///
/// The operator owns every file handle it opens and releases it on all exit
/// paths. Already-written output is left in place when an operation fails.
///
/// # Examples
///
/// ```no_run
/// use gar_core::ArchiveOptions;
/// use gar_core::Operator;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let operator = Operator::new(ArchiveOptions::default().with_password("secret"))?;
/// operator.compress(Path::new("project"), Path::new("project.zip"))?;
/// operator.extract(Path::new("project.zip"), Path::new("restored"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Operator {
    options: ArchiveOptions,
}

impl Operator {
    /// Creates an operator after validating `options`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the options are invalid.
    pub fn new(options: ArchiveOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options every operation uses.
    #[must_use]
    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Packs `input` (a file or a directory tree) into `output`.
    ///
    /// The output is created or truncated. When `output` lies inside
    /// `input` it is left out of the archive.
    ///
    /// # Errors
    ///
    /// Returns `Input` if `input` cannot be stat'd, `Io` if `output` cannot
    /// be created or written, and `UnsupportedEntry` for nodes the format
    /// cannot hold. Errors carry the operation as context.
    pub fn compress(&self, input: &Path, output: &Path) -> Result<CompressionReport> {
        let started = Instant::now();
        let mut report = self
            .compress_inner(input, output)
            .map_err(|e| e.with_context(format!("compress {}", input.display())))?;
        report.duration = started.elapsed();
        self.log_completed("compress", report.duration);
        Ok(report)
    }

    /// Unpacks `input` under `output`, creating the root if needed.
    ///
    /// The container format is detected from the (decrypted) content.
    ///
    /// # Errors
    ///
    /// Returns `Input` for a missing archive, `UnsupportedFormat` or
    /// `InvalidArchive` for bad containers, `Authentication` for a wrong
    /// password or tampered data, `PathTraversal` for escaping entries and
    /// `PartialExtraction` when some zip entries failed.
    pub fn extract(&self, input: &Path, output: &Path) -> Result<ExtractionReport> {
        let started = Instant::now();
        let mut report = self
            .extract_inner(input, output)
            .map_err(|e| e.with_context(format!("extract {}", input.display())))?;
        report.duration = started.elapsed();
        self.log_completed("extract", report.duration);
        Ok(report)
    }

    /// Lists entry names and sizes without writing anything to disk.
    ///
    /// # Errors
    ///
    /// As for [`Operator::extract`], minus the filesystem write failures.
    pub fn list(&self, input: &Path) -> Result<Vec<ListedEntry>> {
        let started = Instant::now();
        let entries = self
            .list_inner(input)
            .map_err(|e| e.with_context(format!("list {}", input.display())))?;
        self.log_completed("list", started.elapsed());
        Ok(entries)
    }

    fn compress_inner(&self, input: &Path, output: &Path) -> Result<CompressionReport> {
        let walker = TreeWalker::new(input)?;
        let file = File::create(output)?;
        let walker = walker.excluding(output);
        let codec = codec_for(self.options.format);
        debug!(
            "compressing {} into {} as {}",
            input.display(),
            output.display(),
            codec.format()
        );

        let mut sink = CountingWriter::new(BufWriter::with_capacity(COPY_BUFFER_SIZE, file));
        let mut report = match &self.options.password {
            None => codec.encode(&walker, &mut sink, &self.options)?,
            Some(password) => {
                let mut writer = EncryptingWriter::new(&mut sink, password)?;
                let report = codec.encode(&walker, &mut writer, &self.options)?;
                writer.finish()?;
                report
            }
        };

        sink.flush()?;
        report.archive_bytes = sink.total_bytes();
        sink.into_inner()
            .into_inner()
            .map_err(|e| ArchiveError::Io(e.into_error()))?;
        Ok(report)
    }

    fn extract_inner(&self, input: &Path, output: &Path) -> Result<ExtractionReport> {
        let mut source = ArchiveSource::open(input, self.options.password.as_ref())?;
        let format = self.detect(&mut source)?;

        let guard = PathGuard::new(DestDir::create(output)?);
        debug!(
            "extracting {} ({format}) into {}",
            input.display(),
            guard.root().as_path().display()
        );
        if format.supports_random_access() {
            debug!("using up to {} workers", self.options.worker_count);
        } else {
            debug!("stream-ordered format, extracting sequentially");
        }

        codec_for(format).extract(source, &guard, &self.options)
    }

    fn list_inner(&self, input: &Path) -> Result<Vec<ListedEntry>> {
        let mut source = ArchiveSource::open(input, self.options.password.as_ref())?;
        let format = self.detect(&mut source)?;
        codec_for(format).list(source)
    }

    fn detect(&self, source: &mut ArchiveSource) -> Result<ArchiveFormat> {
        let format = source.detect_format()?;
        if format != self.options.format {
            debug!(
                "content is {format}, configured format {} applies to compress only",
                self.options.format
            );
        }
        Ok(format)
    }

    fn log_completed(&self, operation: &str, elapsed: Duration) {
        if self.options.verbose {
            info!("{operation} completed in {elapsed:.2?}");
        } else {
            debug!("{operation} completed in {elapsed:.2?}");
        }
    }
}
