//! Extraction strategies for the two access models.

use std::io::Read;
use std::path::PathBuf;

use log::info;
use log::warn;

use super::pool::WorkerPool;
use super::writer;
use crate::ArchiveError;
use crate::ArchiveOptions;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::formats::DecodedEntry;
use crate::formats::EntryMeta;
use crate::formats::ZipIndex;
use crate::report::ExtractionReport;
use crate::security::PathGuard;
use crate::types::EntryKind;

/// What one entry left on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    File(u64),
    Directory,
    Skipped,
}

impl ExtractionReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::File(bytes) => {
                self.files_extracted += 1;
                self.bytes_written += bytes;
            }
            Outcome::Directory => self.directories_created += 1,
            Outcome::Skipped => self.entries_skipped += 1,
        }
    }
}

/// Extracts a forward-only entry stream in order.
///
/// Stops at the first failing entry; entries before it stay on disk. Link,
/// device and FIFO entries are skipped with a warning.
///
/// # Errors
///
/// Returns the first entry error, wrapped with the entry name when known.
pub fn extract_sequential<I, R>(
    entries: I,
    guard: &PathGuard,
    verbose: bool,
) -> Result<ExtractionReport>
where
    I: Iterator<Item = Result<DecodedEntry<R>>>,
    R: Read,
{
    let mut report = ExtractionReport::new();
    let mut buffer = CopyBuffer::new();

    for decoded in entries {
        let DecodedEntry { meta, mut reader } = decoded?;
        if meta.kind.is_special() {
            report.record(skip(&meta));
            continue;
        }

        let outcome = match place(&meta, guard).map_err(|e| e.with_entry(&meta.name))? {
            None => Outcome::Directory,
            Some(target) => writer::write_file(&mut reader, &target, meta.mode, &mut buffer)
                .map(Outcome::File)
                .map_err(|e| e.with_entry(&meta.name))?,
        };
        if verbose {
            info!("extracted {}", meta.name);
        }
        report.record(outcome);
    }

    Ok(report)
}

/// Extracts a zip archive with a bounded worker pool.
///
/// Each worker owns a clone of the index and a copy buffer. Every entry is
/// attempted; failures are logged as they happen and aggregated at the end.
///
/// # Errors
///
/// Returns `InvalidConfiguration` for a zero worker count, or
/// `PartialExtraction` if any entry failed.
pub fn extract_parallel(
    index: &ZipIndex,
    guard: &PathGuard,
    options: &ArchiveOptions,
) -> Result<ExtractionReport> {
    let pool = WorkerPool::new(options.worker_count)?;
    let verbose = options.verbose;

    let outcomes = pool.run(
        0..index.len(),
        || ZipWorker {
            index: index.clone(),
            buffer: CopyBuffer::new(),
        },
        |worker, position| worker.extract(position, guard, verbose),
    )?;

    let mut report = ExtractionReport::new();
    for outcome in outcomes {
        report.record(outcome);
    }
    Ok(report)
}

struct ZipWorker {
    index: ZipIndex,
    buffer: CopyBuffer,
}

impl ZipWorker {
    fn extract(&mut self, position: usize, guard: &PathGuard, verbose: bool) -> Result<Outcome> {
        let meta = self
            .index
            .entry(position)
            .map_err(|e| e.with_entry(format!("#{position}")))?;
        if meta.kind.is_special() {
            return Ok(skip(&meta));
        }

        let outcome = self
            .write_entry(position, &meta, guard)
            .map_err(|e| e.with_entry(&meta.name))?;

        if verbose {
            info!("extracted {}", meta.name);
        }
        Ok(outcome)
    }

    fn write_entry(&mut self, position: usize, meta: &EntryMeta, guard: &PathGuard) -> Result<Outcome> {
        let Some(target) = place(meta, guard)? else {
            return Ok(Outcome::Directory);
        };
        let mut reader = self.index.open_entry(position)?;
        let written = writer::write_file(&mut reader, &target, meta.mode, &mut self.buffer)?;
        Ok(Outcome::File(written))
    }
}

fn skip(meta: &EntryMeta) -> Outcome {
    warn!("skipping {} entry {}", meta.kind, meta.name);
    Outcome::Skipped
}

/// Validates the destination of `meta`. Directories are created here;
/// files get their target path back for the caller to fill.
fn place(meta: &EntryMeta, guard: &PathGuard) -> Result<Option<PathBuf>> {
    let target = guard.resolve(&meta.name)?;

    match meta.kind {
        EntryKind::Directory => {
            writer::create_directory(&target)?;
            Ok(None)
        }
        EntryKind::File => Ok(Some(target)),
        EntryKind::Special(kind) => Err(ArchiveError::UnsupportedEntry {
            path: PathBuf::from(&meta.name),
            kind,
        }),
    }
}
