//! Zip: the directory-indexed format.

use std::fs::File;
use std::io::Seek;
use std::io::Write;

use log::info;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use super::ArchiveSource;
use super::EntryMeta;
use super::FormatCodec;
use super::decode_error;
use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::ArchiveOptions;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::creation::SourceEntry;
use crate::creation::TreeWalker;
use crate::extraction::engine;
use crate::io::SharedSource;
use crate::report::CompressionReport;
use crate::report::ExtractionReport;
use crate::report::ListedEntry;
use crate::security::PathGuard;
use crate::types::EntryKind;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Zip codec: deflate entries, a central directory, parallel extraction.
///
/// Encoding writes straight into the sink in streaming mode: sizes and CRCs
/// follow each entry in a data descriptor instead of being patched into the
/// local header, so the sink never has to seek.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodec;

impl FormatCodec for ZipCodec {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn encode(
        &self,
        walker: &TreeWalker,
        sink: &mut dyn Write,
        options: &ArchiveOptions,
    ) -> Result<CompressionReport> {
        let mut writer = ZipWriter::new_stream(sink);
        let base = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(i64::from(options.compression_level.deflate_level())));

        let mut report = CompressionReport::new();
        let mut buffer = CopyBuffer::new();

        for entry in walker.walk() {
            let entry = entry?;
            add_entry(&mut writer, &entry, base, &mut buffer, &mut report)
                .map_err(|e| e.with_entry(&entry.name))?;
            if options.verbose {
                info!("added {}", entry.name);
            }
        }

        writer.finish()?;
        Ok(report)
    }

    fn list(&self, source: ArchiveSource) -> Result<Vec<ListedEntry>> {
        let mut index = ZipIndex::open(source.into_random_access()?)?;
        Ok(index
            .entries()?
            .into_iter()
            .map(EntryMeta::into_listed)
            .collect())
    }

    fn extract(
        &self,
        source: ArchiveSource,
        guard: &PathGuard,
        options: &ArchiveOptions,
    ) -> Result<ExtractionReport> {
        let index = ZipIndex::open(source.into_random_access()?)?;
        engine::extract_parallel(&index, guard, options)
    }
}

fn add_entry<W: Write + Seek>(
    writer: &mut ZipWriter<W>,
    entry: &SourceEntry,
    base: SimpleFileOptions,
    buffer: &mut CopyBuffer,
    report: &mut CompressionReport,
) -> Result<()> {
    let options = base.unix_permissions(entry.mode);

    match entry.kind {
        EntryKind::Directory => {
            writer.add_directory(format!("{}/", entry.name), options)?;
            report.directories_added += 1;
        }
        EntryKind::File => {
            let mut file = File::open(&entry.path)?;
            let options = options.large_file(entry.size >= u64::from(u32::MAX));
            writer.start_file(entry.name.as_str(), options)?;
            report.bytes_read += copy_with_buffer(&mut file, writer, buffer)?;
            report.files_added += 1;
        }
        EntryKind::Special(kind) => {
            return Err(ArchiveError::UnsupportedEntry {
                path: entry.path.clone(),
                kind,
            });
        }
    }

    Ok(())
}

/// Parsed central directory over a shared source.
///
/// Cloning is cheap: clones share the parsed directory and the underlying
/// bytes and keep their own read position, so each extraction worker owns
/// one clone.
#[derive(Debug, Clone)]
pub struct ZipIndex {
    archive: ZipArchive<SharedSource>,
}

impl ZipIndex {
    /// Parses the central directory.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the directory cannot be found or read.
    pub fn open(source: SharedSource) -> Result<Self> {
        let archive = ZipArchive::new(source).map_err(zip_error)?;
        Ok(Self { archive })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    /// Metadata of entry `index`, without decompressing anything.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` for an unreadable header. Symlink entries
    /// are reported as [`EntryKind::Special`].
    pub fn entry(&mut self, index: usize) -> Result<EntryMeta> {
        let file = self.archive.by_index_raw(index).map_err(zip_error)?;
        Ok(entry_meta(&file))
    }

    /// Metadata of every entry, in directory order.
    ///
    /// # Errors
    ///
    /// See [`ZipIndex::entry`].
    pub fn entries(&mut self) -> Result<Vec<EntryMeta>> {
        (0..self.len()).map(|index| self.entry(index)).collect()
    }

    /// Decompressing reader for entry `index`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the entry cannot be opened.
    pub fn open_entry(&mut self, index: usize) -> Result<ZipFile<'_, SharedSource>> {
        self.archive.by_index(index).map_err(zip_error)
    }
}

fn entry_meta(file: &ZipFile<'_, SharedSource>) -> EntryMeta {
    let mode = file.unix_mode();

    let kind = if mode.is_some_and(|m| m & S_IFMT == S_IFLNK) {
        EntryKind::Special("symlink")
    } else if file.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::File
    };

    EntryMeta {
        name: file.name().to_string(),
        kind,
        size: if kind.is_directory() { 0 } else { file.size() },
        mode,
    }
}

fn zip_error(err: ZipError) -> ArchiveError {
    match err {
        ZipError::Io(io_err) => decode_error(io_err),
        other => ArchiveError::InvalidArchive(other.to_string()),
    }
}
