//! Tar inside gzip: the sequential format.

use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::io::{self};

use flate2::Compression;
use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use log::info;
use tar::Archive;
use tar::Builder;
use tar::Entry;
use tar::EntryType;
use tar::Header;

use super::ArchiveSource;
use super::DecodedEntry;
use super::EntryMeta;
use super::FormatCodec;
use super::decode_error;
use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::ArchiveOptions;
use crate::Result;
use crate::copy::COPY_BUFFER_SIZE;
use crate::creation::SourceEntry;
use crate::creation::TreeWalker;
use crate::extraction::engine;
use crate::report::CompressionReport;
use crate::report::ExtractionReport;
use crate::report::ListedEntry;
use crate::security::PathGuard;
use crate::types::EntryKind;

/// Tar.gz codec: streamed in both directions, extracted in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzCodec;

impl FormatCodec for TarGzCodec {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGz
    }

    fn encode(
        &self,
        walker: &TreeWalker,
        sink: &mut dyn Write,
        options: &ArchiveOptions,
    ) -> Result<CompressionReport> {
        let level = Compression::new(options.compression_level.deflate_level());
        let mut builder = Builder::new(GzEncoder::new(sink, level));
        let mut report = CompressionReport::new();

        for entry in walker.walk() {
            let entry = entry?;
            append_entry(&mut builder, &entry, &mut report)
                .map_err(|e| e.with_entry(&entry.name))?;
            if options.verbose {
                info!("added {}", entry.name);
            }
        }

        builder.into_inner()?.finish()?;
        Ok(report)
    }

    fn list(&self, source: ArchiveSource) -> Result<Vec<ListedEntry>> {
        let mut decoder = TarDecoder::new(source.into_stream());
        let listed = decoder
            .entries()?
            .map(|decoded| decoded.map(|d| d.meta.into_listed()))
            .collect::<Result<Vec<_>>>()?;
        decoder.finish()?;
        Ok(listed)
    }

    fn extract(
        &self,
        source: ArchiveSource,
        guard: &PathGuard,
        options: &ArchiveOptions,
    ) -> Result<ExtractionReport> {
        let mut decoder = TarDecoder::new(source.into_stream());
        let report = engine::extract_sequential(decoder.entries()?, guard, options.verbose)?;
        decoder.finish()?;
        Ok(report)
    }
}

fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    entry: &SourceEntry,
    report: &mut CompressionReport,
) -> Result<()> {
    let mut header = Header::new_gnu();

    match entry.kind {
        EntryKind::Directory => {
            let metadata = fs::metadata(&entry.path)?;
            header.set_metadata(&metadata);
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            header.set_mode(entry.mode);
            builder.append_data(&mut header, format!("{}/", entry.name), io::empty())?;
            report.directories_added += 1;
        }
        EntryKind::File => {
            let file = File::open(&entry.path)?;
            let metadata = file.metadata()?;
            let size = metadata.len();
            header.set_metadata(&metadata);
            header.set_size(size);
            header.set_mode(entry.mode);
            // Bounded so a file that grows mid-read cannot overrun its header.
            let content = BufReader::with_capacity(COPY_BUFFER_SIZE, file).take(size);
            builder.append_data(&mut header, &entry.name, content)?;
            report.bytes_read += size;
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

/// Forward-only reader over a gzip-compressed tar stream.
pub struct TarDecoder<R: BufRead> {
    archive: Archive<GzDecoder<R>>,
}

impl<R: BufRead> TarDecoder<R> {
    /// Wraps a (possibly decrypted) byte stream.
    pub fn new(stream: R) -> Self {
        Self {
            archive: Archive::new(GzDecoder::new(stream)),
        }
    }

    /// Lazily yields entries in stream order.
    ///
    /// Global pax headers are skipped. Links, devices and FIFOs are yielded
    /// as [`EntryKind::Special`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` if the stream cannot be iterated at all.
    pub fn entries(
        &mut self,
    ) -> Result<impl Iterator<Item = Result<DecodedEntry<Entry<'_, GzDecoder<R>>>>>> {
        let entries = self.archive.entries().map_err(decode_error)?;

        Ok(entries.filter_map(|entry| {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => return Some(Err(decode_error(e))),
            };
            if entry.header().entry_type() == EntryType::XGlobalHeader {
                return None;
            }
            Some(Ok(DecodedEntry {
                meta: entry_meta(&entry),
                reader: entry,
            }))
        }))
    }

    /// Reads the rest of the stream.
    ///
    /// Tar stops at its end-of-archive marker, so without this the gzip
    /// trailer (and, for encrypted input, the final authenticated chunk)
    /// would never be checked.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` for a bad gzip trailer and `Authentication`
    /// for a truncated or extended ciphertext.
    pub fn finish(self) -> Result<()> {
        let mut decoder = self.archive.into_inner();
        io::copy(&mut decoder, &mut io::sink()).map_err(decode_error)?;
        let mut rest = decoder.into_inner();
        io::copy(&mut rest, &mut io::sink()).map_err(decode_error)?;
        Ok(())
    }
}

fn entry_meta<R: Read>(entry: &Entry<'_, R>) -> EntryMeta {
    let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
    let header = entry.header();

    let kind = match header.entry_type() {
        EntryType::Directory => EntryKind::Directory,
        EntryType::Regular | EntryType::Continuous => EntryKind::File,
        other => EntryKind::Special(special_label(other)),
    };

    EntryMeta {
        name,
        kind,
        size: if kind.is_directory() { 0 } else { entry.size() },
        mode: header.mode().ok(),
    }
}

fn special_label(entry_type: EntryType) -> &'static str {
    match entry_type {
        EntryType::Symlink => "symlink",
        EntryType::Link => "hardlink",
        EntryType::Char | EntryType::Block => "device",
        EntryType::Fifo => "fifo",
        _ => "special",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_utils::append_raw;
    use crate::test_utils::create_test_tar_gz;
    use crate::test_utils::create_test_tar_gz_with;
    use std::io::Seek;
    use tempfile::TempDir;

    fn write_temp(bytes: &[u8]) -> File {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.rewind().unwrap();
        file
    }

    fn decode_names(bytes: &[u8]) -> Vec<Result<EntryMeta>> {
        let mut decoder = TarDecoder::new(bytes);
        decoder
            .entries()
            .unwrap()
            .map(|d| d.map(|d| d.meta))
            .collect()
    }

    #[test]
    fn test_encode_then_decode_tree() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("docs")).unwrap();
        fs::write(temp.path().join("docs/readme.md"), "# hi").unwrap();

        let walker = TreeWalker::new(temp.path()).unwrap();
        let mut out = Vec::new();
        let report = TarGzCodec
            .encode(&walker, &mut out, &ArchiveOptions::default())
            .unwrap();
        assert_eq!(report.files_added, 1);
        assert_eq!(report.directories_added, 1);

        let metas: Vec<_> = decode_names(&out).into_iter().map(|m| m.unwrap()).collect();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].name, "docs/");
        assert_eq!(metas[0].kind, EntryKind::Directory);
        assert_eq!(metas[1].name, "docs/readme.md");
        assert_eq!(metas[1].size, 4);
    }

    #[test]
    fn test_entry_content_is_readable() {
        let bytes = create_test_tar_gz(&[("a.txt", b"alpha")]);
        let mut decoder = TarDecoder::new(&bytes[..]);
        let mut entries = decoder.entries().unwrap();

        let mut decoded = entries.next().unwrap().unwrap();
        let mut content = String::new();
        decoded.reader.read_to_string(&mut content).unwrap();
        assert_eq!(content, "alpha");
        assert!(entries.next().is_none());
        drop(entries);

        decoder.finish().unwrap();
    }

    #[test]
    fn test_symlink_entry_is_special() {
        let bytes = create_test_tar_gz_with(|builder| {
            let mut header = Header::new_gnu();
            header.set_entry_type(EntryType::Symlink);
            header.set_size(0);
            builder
                .append_link(&mut header, "link", "/etc/passwd")
                .unwrap();
        });

        let results = decode_names(&bytes);
        assert_eq!(results[0].as_ref().unwrap().kind, EntryKind::Special("symlink"));
    }

    #[test]
    fn test_list_reports_links() {
        let bytes = create_test_tar_gz_with(|builder| {
            append_raw(builder, "a.txt", EntryType::Regular, b"alpha");
            let mut header = Header::new_gnu();
            header.set_entry_type(EntryType::Symlink);
            header.set_size(0);
            builder.append_link(&mut header, "link", "a.txt").unwrap();
            append_raw(builder, "hard", EntryType::Link, b"");
        });

        let source = ArchiveSource::Plain(BufReader::new(write_temp(&bytes)));
        let listed = TarGzCodec.list(source).unwrap();

        let rows: Vec<_> = listed.iter().map(|e| (e.name.as_str(), e.kind)).collect();
        assert_eq!(
            rows,
            vec![
                ("a.txt", EntryKind::File),
                ("link", EntryKind::Special("symlink")),
                ("hard", EntryKind::Special("hardlink")),
            ]
        );
        assert_eq!(listed[0].size, 5);
    }

    #[test]
    fn test_truncated_stream_is_invalid() {
        let mut state = 0x2545_f491_u32;
        let noise: Vec<u8> = (0..16 * 1024)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state.to_le_bytes()[0]
            })
            .collect();
        let bytes = create_test_tar_gz(&[("noise.bin", &noise)]);
        let truncated = &bytes[..bytes.len() / 2];

        let mut decoder = TarDecoder::new(truncated);
        let outcome: Result<Vec<u8>> = decoder.entries().and_then(|mut entries| {
            let mut decoded = entries.next().expect("header survives truncation")?;
            let mut content = Vec::new();
            decoded.reader.read_to_end(&mut content).map_err(decode_error)?;
            Ok(content)
        });
        assert!(outcome.is_err());
    }

    #[test]
    fn test_not_gzip_is_invalid() {
        let mut decoder = TarDecoder::new(&b"\x1f\x8bnot a real gzip member"[..]);
        let first = decoder.entries().map(|mut e| e.next());
        assert!(matches!(first, Err(_) | Ok(Some(Err(_)))));
    }
}
