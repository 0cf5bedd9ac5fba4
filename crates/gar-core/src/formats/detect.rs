//! Archive format detection by content.

use std::io::BufRead;
use std::io::{self};

use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::Result;

/// Local file header, empty archive and spanned archive signatures.
const ZIP_MAGICS: [[u8; 4]; 3] = [
    [b'P', b'K', 0x03, 0x04],
    [b'P', b'K', 0x05, 0x06],
    [b'P', b'K', 0x07, 0x08],
];

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

impl ArchiveFormat {
    /// Identifies a container from its leading bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use gar_core::ArchiveFormat;
    ///
    /// assert_eq!(ArchiveFormat::sniff(b"PK\x03\x04rest"), Some(ArchiveFormat::Zip));
    /// assert_eq!(ArchiveFormat::sniff(&[0x1F, 0x8B, 0x08]), Some(ArchiveFormat::TarGz));
    /// assert_eq!(ArchiveFormat::sniff(b"7z"), None);
    /// ```
    #[must_use]
    pub fn sniff(head: &[u8]) -> Option<Self> {
        if ZIP_MAGICS.iter().any(|magic| head.starts_with(magic)) {
            Some(Self::Zip)
        } else if head.starts_with(&GZIP_MAGIC) {
            Some(Self::TarGz)
        } else {
            None
        }
    }
}

/// Peeks at the head of `reader` without consuming it.
///
/// # Errors
///
/// Returns `UnsupportedFormat` for unrecognised content (including an empty
/// stream), or the read error converted by `From<io::Error>`.
pub fn detect_format<R: BufRead + ?Sized>(reader: &mut R) -> Result<ArchiveFormat> {
    loop {
        match reader.fill_buf() {
            Ok(head) => return ArchiveFormat::sniff(head).ok_or(ArchiveError::UnsupportedFormat),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
}
