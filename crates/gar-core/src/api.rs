//! Free-function entry points over [`Operator`].

use std::path::Path;

use crate::ArchiveOptions;
use crate::Operator;
use crate::Result;
use crate::report::CompressionReport;
use crate::report::ExtractionReport;
use crate::report::ListedEntry;

/// Packs `input` into the archive `output`.
///
/// The format comes from `options.format`; a password inserts the
/// encryption layer.
///
/// # Errors
///
/// See [`Operator::compress`].
///
/// # Examples
///
/// ```no_run
/// use gar_core::ArchiveFormat;
/// use gar_core::ArchiveOptions;
/// use gar_core::compress;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let options = ArchiveOptions::default().with_format(ArchiveFormat::TarGz);
/// let report = compress("src", "src.tar.gz", &options)?;
/// println!("Added {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
pub fn compress<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ArchiveOptions,
) -> Result<CompressionReport> {
    Operator::new(options.clone())?.compress(input.as_ref(), output.as_ref())
}

/// Unpacks the archive `input` under the directory `output`.
///
/// # Errors
///
/// See [`Operator::extract`].
///
/// # Examples
///
/// ```no_run
/// use gar_core::ArchiveOptions;
/// use gar_core::extract;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = extract("backup.zip", "/tmp/restore", &ArchiveOptions::default())?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &ArchiveOptions,
) -> Result<ExtractionReport> {
    Operator::new(options.clone())?.extract(input.as_ref(), output.as_ref())
}

/// Lists the entries of the archive `input`.
///
/// # Errors
///
/// See [`Operator::list`].
pub fn list<P: AsRef<Path>>(input: P, options: &ArchiveOptions) -> Result<Vec<ListedEntry>> {
    Operator::new(options.clone())?.list(input.as_ref())
}
