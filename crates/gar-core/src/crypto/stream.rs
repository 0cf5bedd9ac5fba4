//! Chunked AES-256-GCM writer and reader.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use aes_gcm::Aes256Gcm;
use aes_gcm::Nonce;
use aes_gcm::aead::Aead;
use aes_gcm::aead::Payload;
use zeroize::Zeroizing;

use super::authentication_error;
use super::key::NONCE_LEN;
use super::key::StreamHeader;
use super::key::cipher_for;
use crate::ArchiveError;
use crate::Password;
use crate::Result;

/// Maximum plaintext bytes per sealed chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

const FLAG_MORE: u8 = 0;
const FLAG_FINAL: u8 = 1;

/// Nonce for chunk `index`: the base nonce with its low 8 bytes XOR-ed with
/// the big-endian counter.
pub(crate) fn chunk_nonce(base: &[u8; NONCE_LEN], index: u64) -> [u8; NONCE_LEN] {
    let mut nonce = *base;
    for (byte, counter) in nonce[NONCE_LEN - 8..].iter_mut().zip(index.to_be_bytes()) {
        *byte ^= counter;
    }
    nonce
}

/// Encrypting sink.
///
/// Writes the [`StreamHeader`] on construction, then seals plaintext in
/// 64 KiB chunks. A full chunk is only sealed once more data arrives, so the
/// last chunk is always sealed by [`EncryptingWriter::finish`] with the
/// final flag set. Dropping the writer without calling `finish` leaves a
/// stream that will not authenticate.
///
/// # Examples
///
/// ```
/// use gar_core::Password;
/// use gar_core::crypto::DecryptingReader;
/// use gar_core::crypto::EncryptingWriter;
/// use std::io::Read;
/// use std::io::Write;
///
/// # fn main() -> gar_core::Result<()> {
/// let password = Password::new("secret");
///
/// let mut writer = EncryptingWriter::new(Vec::new(), &password)?;
/// writer.write_all(b"archive bytes")?;
/// let sealed = writer.finish()?;
///
/// let mut reader = DecryptingReader::new(sealed.as_slice(), &password)?;
/// let mut plain = Vec::new();
/// reader.read_to_end(&mut plain)?;
/// assert_eq!(plain, b"archive bytes");
/// # Ok(())
/// # }
/// ```
pub struct EncryptingWriter<W: Write> {
    inner: W,
    cipher: Aes256Gcm,
    base_nonce: [u8; NONCE_LEN],
    chunk_index: u64,
    buffer: Zeroizing<Vec<u8>>,
}

impl<W: Write> EncryptingWriter<W> {
    /// Derives a key from `password` and a fresh salt and writes the header.
    ///
    /// # Errors
    ///
    /// Returns `KeyDerivation` if the cipher cannot be keyed, or `Io` if the
    /// header cannot be written.
    pub fn new(mut inner: W, password: &Password) -> Result<Self> {
        let header = StreamHeader::generate();
        let cipher = cipher_for(password, &header.salt)?;
        header.write_to(&mut inner)?;

        Ok(Self {
            inner,
            cipher,
            base_nonce: header.nonce,
            chunk_index: 0,
            buffer: Zeroizing::new(Vec::with_capacity(CHUNK_SIZE)),
        })
    }

    fn seal_chunk(&mut self, flag: u8) -> io::Result<()> {
        let nonce = chunk_nonce(&self.base_nonce, self.chunk_index);
        let ciphertext = self
            .cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &self.buffer,
                    aad: &[flag],
                },
            )
            .map_err(|_| io::Error::other("chunk encryption failed"))?;

        self.chunk_index = self
            .chunk_index
            .checked_add(1)
            .ok_or_else(|| io::Error::other("chunk counter exhausted"))?;

        let len = u32::try_from(ciphertext.len())
            .map_err(|_| io::Error::other("sealed chunk exceeds frame length"))?;

        self.inner.write_all(&[flag])?;
        self.inner.write_all(&len.to_le_bytes())?;
        self.inner.write_all(&ciphertext)?;
        self.buffer.clear();
        Ok(())
    }

    /// Seals the remaining plaintext as the final chunk and returns the sink.
    ///
    /// # Errors
    ///
    /// Returns `Io` if sealing or writing fails.
    pub fn finish(mut self) -> Result<W> {
        self.seal_chunk(FLAG_FINAL)?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for EncryptingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.buffer.len() == CHUNK_SIZE {
            self.seal_chunk(FLAG_MORE)?;
        }

        let n = (CHUNK_SIZE - self.buffer.len()).min(buf.len());
        self.buffer.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Authenticating source.
///
/// Reads the header on construction, then opens one frame at a time. Bytes
/// are handed out only after their whole chunk has been authenticated. Every
/// failure (bad tag, wrong password, malformed frame, missing final chunk,
/// data after the final chunk) surfaces as an `io::Error` that
/// [`super::is_authentication_failure`] recognises.
pub struct DecryptingReader<R: Read> {
    inner: R,
    cipher: Aes256Gcm,
    base_nonce: [u8; NONCE_LEN],
    chunk_index: u64,
    frame: Vec<u8>,
    plaintext: Zeroizing<Vec<u8>>,
    position: usize,
    finished: bool,
}

impl<R: Read> DecryptingReader<R> {
    /// Reads the header from `inner` and re-derives the key.
    ///
    /// # Errors
    ///
    /// Returns `Authentication` if the source is too short to hold a header,
    /// `KeyDerivation` if the cipher cannot be keyed, or `Io` on read errors.
    pub fn new(mut inner: R, password: &Password) -> Result<Self> {
        let header = StreamHeader::read_from(&mut inner).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                ArchiveError::Authentication
            } else {
                ArchiveError::from(e)
            }
        })?;
        let cipher = cipher_for(password, &header.salt)?;

        Ok(Self {
            inner,
            cipher,
            base_nonce: header.nonce,
            chunk_index: 0,
            frame: Vec::with_capacity(CHUNK_SIZE + TAG_LEN),
            plaintext: Zeroizing::new(Vec::new()),
            position: 0,
            finished: false,
        })
    }

    fn open_next_chunk(&mut self) -> io::Result<()> {
        let mut head = [0u8; 5];
        read_frame_bytes(&mut self.inner, &mut head)?;

        let flag = head[0];
        if flag != FLAG_MORE && flag != FLAG_FINAL {
            return Err(authentication_error());
        }
        let len = u32::from_le_bytes([head[1], head[2], head[3], head[4]]) as usize;
        if !(TAG_LEN..=CHUNK_SIZE + TAG_LEN).contains(&len) {
            return Err(authentication_error());
        }

        self.frame.resize(len, 0);
        read_frame_bytes(&mut self.inner, &mut self.frame)?;

        let nonce = chunk_nonce(&self.base_nonce, self.chunk_index);
        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: &self.frame,
                    aad: &[flag],
                },
            )
            .map_err(|_| authentication_error())?;

        if flag == FLAG_FINAL {
            expect_end_of_stream(&mut self.inner)?;
            self.finished = true;
        }

        self.chunk_index = self
            .chunk_index
            .checked_add(1)
            .ok_or_else(authentication_error)?;
        self.plaintext = Zeroizing::new(plaintext);
        self.position = 0;
        Ok(())
    }
}

impl<R: Read> Read for DecryptingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        loop {
            let available = &self.plaintext[self.position..];
            if !available.is_empty() {
                let n = available.len().min(buf.len());
                buf[..n].copy_from_slice(&available[..n]);
                self.position += n;
                return Ok(n);
            }
            if self.finished {
                return Ok(0);
            }
            self.open_next_chunk()?;
        }
    }
}

/// `read_exact` that reports a truncated frame as an authentication failure.
fn read_frame_bytes<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            authentication_error()
        } else {
            e
        }
    })
}

fn expect_end_of_stream<R: Read>(reader: &mut R) -> io::Result<()> {
    let mut extra = [0u8; 1];
    loop {
        match reader.read(&mut extra) {
            Ok(0) => return Ok(()),
            Ok(_) => return Err(authentication_error()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}
