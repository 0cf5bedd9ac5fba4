//! Container formats.
//!
//! Both formats sit behind [`FormatCodec`]. They differ in how entries can be
//! read back: zip carries a central directory that is parsed once and then
//! allows independent, concurrent entry reads; tar.gz is one forward-only
//! stream whose entries must be consumed in order.

pub mod detect;
pub mod source;
pub mod tar;
pub mod zip;

use std::io::Write;
use std::io::{self};

pub use detect::detect_format;
pub use source::ArchiveSource;
pub use tar::TarDecoder;
pub use tar::TarGzCodec;
pub use zip::ZipCodec;
pub use zip::ZipIndex;

use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::ArchiveOptions;
use crate::Result;
use crate::creation::TreeWalker;
use crate::crypto::is_authentication_failure;
use crate::report::CompressionReport;
use crate::report::ExtractionReport;
use crate::report::ListedEntry;
use crate::security::PathGuard;
use crate::types::EntryKind;

/// Metadata of one entry read back from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMeta {
    /// Name as stored. Untrusted until it passes the [`PathGuard`].
    pub name: String,
    /// File or directory.
    pub kind: EntryKind,
    /// Uncompressed size (0 for directories).
    pub size: u64,
    /// Recorded permission bits, if any.
    pub mode: Option<u32>,
}

impl EntryMeta {
    /// Drops the fields a listing does not show.
    #[must_use]
    pub fn into_listed(self) -> ListedEntry {
        ListedEntry {
            name: self.name,
            size: self.size,
            kind: self.kind,
        }
    }
}

/// An entry yielded by a sequential decoder, together with its content.
///
/// The reader must be drained (or dropped) before the next entry is pulled.
pub struct DecodedEntry<R> {
    /// Entry metadata.
    pub meta: EntryMeta,
    /// Entry content; empty for directories.
    pub reader: R,
}

/// Encode, list and extract for one container format.
pub trait FormatCodec: Sync {
    /// The format this codec handles.
    fn format(&self) -> ArchiveFormat;

    /// Writes every entry produced by `walker` into `sink`.
    ///
    /// The returned report has `archive_bytes` and `duration` unset; the
    /// caller owns the sink and the clock.
    ///
    /// # Errors
    ///
    /// Returns `Io` on read/write failures and `UnsupportedEntry` for nodes
    /// the format cannot hold.
    fn encode(
        &self,
        walker: &TreeWalker,
        sink: &mut dyn Write,
        options: &ArchiveOptions,
    ) -> Result<CompressionReport>;

    /// Reads names and sizes without writing anything to disk.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArchive` for a corrupt container and `Authentication`
    /// for a corrupt or wrongly-keyed encrypted one.
    fn list(&self, source: ArchiveSource) -> Result<Vec<ListedEntry>>;

    /// Writes every entry under the guard's root.
    ///
    /// # Errors
    ///
    /// As for [`FormatCodec::list`], plus `PathTraversal` and `Io` per entry.
    fn extract(
        &self,
        source: ArchiveSource,
        guard: &PathGuard,
        options: &ArchiveOptions,
    ) -> Result<ExtractionReport>;
}

/// Returns the codec for `format`.
#[must_use]
pub fn codec_for(format: ArchiveFormat) -> &'static dyn FormatCodec {
    match format {
        ArchiveFormat::Zip => &ZipCodec,
        ArchiveFormat::TarGz => &TarGzCodec,
    }
}

/// Classifies an I/O error raised while parsing container bytes.
pub(crate) fn decode_error(err: io::Error) -> ArchiveError {
    if is_authentication_failure(&err) {
        return ArchiveError::Authentication;
    }
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput | io::ErrorKind::UnexpectedEof => {
            ArchiveError::InvalidArchive(err.to_string())
        }
        _ => ArchiveError::Io(err),
    }
}
