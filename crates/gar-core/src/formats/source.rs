//! Opened archive input, before the format is known.

use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::{self};
use std::path::Path;

use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::Password;
use crate::Result;
use crate::copy::COPY_BUFFER_SIZE;
use crate::crypto::DecryptingReader;
use crate::crypto::stream::CHUNK_SIZE;
use crate::io::SharedSource;

use super::detect::detect_format;

/// Archive bytes as seen by a codec: either the raw file or the
/// authenticated plaintext of an encrypted one.
pub enum ArchiveSource {
    /// Unencrypted archive file.
    Plain(BufReader<File>),
    /// Encrypted archive file, decrypted on the fly.
    Decrypted(BufReader<DecryptingReader<BufReader<File>>>),
}

impl ArchiveSource {
    /// Opens `path`, inserting the decrypting reader when a password is set.
    ///
    /// # Errors
    ///
    /// Returns `Input` if the path is missing, unreadable or a directory,
    /// and `Authentication` if it is too short to be encrypted.
    pub fn open(path: &Path, password: Option<&Password>) -> Result<Self> {
        let input_error = |source| ArchiveError::Input {
            path: path.to_path_buf(),
            source,
        };

        if fs::metadata(path).map_err(input_error)?.is_dir() {
            return Err(input_error(io::Error::new(
                io::ErrorKind::InvalidInput,
                "is a directory",
            )));
        }
        let file = File::open(path).map_err(input_error)?;
        let reader = BufReader::with_capacity(COPY_BUFFER_SIZE, file);

        match password {
            None => Ok(Self::Plain(reader)),
            Some(password) => {
                let decrypting = DecryptingReader::new(reader, password)?;
                Ok(Self::Decrypted(BufReader::with_capacity(CHUNK_SIZE, decrypting)))
            }
        }
    }

    /// Returns `true` if the bytes pass through the decrypting reader.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Decrypted(_))
    }

    /// Identifies the container from its magic bytes without consuming them.
    ///
    /// On an encrypted source this authenticates the first chunk, so a wrong
    /// password fails here.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` or `Authentication`.
    pub fn detect_format(&mut self) -> Result<ArchiveFormat> {
        match self {
            Self::Plain(reader) => detect_format(reader),
            Self::Decrypted(reader) => detect_format(reader),
        }
    }

    /// Converts into a clone-able random-access source.
    ///
    /// An encrypted archive is decrypted in full first, so every byte of the
    /// index and of each entry has been authenticated before it is parsed.
    ///
    /// # Errors
    ///
    /// Returns `Authentication` on tampered or truncated ciphertext, `Io` on
    /// read failures.
    pub fn into_random_access(self) -> Result<SharedSource> {
        match self {
            Self::Plain(reader) => Ok(SharedSource::from_file(reader.into_inner())?),
            Self::Decrypted(mut reader) => {
                let mut plaintext = Vec::new();
                reader.read_to_end(&mut plaintext)?;
                Ok(SharedSource::from_bytes(plaintext))
            }
        }
    }

    /// Converts into a forward-only byte stream.
    #[must_use]
    pub fn into_stream(self) -> Box<dyn BufRead> {
        match self {
            Self::Plain(reader) => Box::new(reader),
            Self::Decrypted(reader) => Box::new(reader),
        }
    }
}
