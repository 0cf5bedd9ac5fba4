//! Key derivation and the stream header.

use std::io::Read;
use std::io::Write;
use std::io::{self};

use aes_gcm::Aes256Gcm;
use aes_gcm::aead::KeyInit;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::ArchiveError;
use crate::Password;
use crate::Result;

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Derived key length (AES-256).
pub const KEY_LEN: usize = 32;

/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ROUNDS: u32 = 100_000;

/// Salt and base nonce written once at the start of an encrypted archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Random salt fed to the key derivation.
    pub salt: [u8; SALT_LEN],
    /// Random base nonce; chunk nonces are derived from it.
    pub nonce: [u8; NONCE_LEN],
}

impl StreamHeader {
    /// Encoded size in bytes.
    pub const LEN: usize = SALT_LEN + NONCE_LEN;

    /// Draws a fresh salt and nonce from the OS RNG.
    #[must_use]
    pub fn generate() -> Self {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);
        Self { salt, nonce }
    }

    /// Writes salt then nonce.
    ///
    /// # Errors
    ///
    /// Propagates write errors.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.salt)?;
        writer.write_all(&self.nonce)
    }

    /// Reads salt then nonce.
    ///
    /// # Errors
    ///
    /// Returns `UnexpectedEof` if fewer than [`Self::LEN`] bytes are
    /// available.
    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        reader.read_exact(&mut salt)?;
        reader.read_exact(&mut nonce)?;
        Ok(Self { salt, nonce })
    }
}

/// Derives the archive key with PBKDF2-HMAC-SHA256.
///
/// The returned buffer is wiped on drop.
#[must_use]
pub fn derive_key(password: &Password, salt: &[u8]) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ROUNDS, key.as_mut_slice());
    key
}

pub(crate) fn cipher_for(password: &Password, salt: &[u8]) -> Result<Aes256Gcm> {
    let key = derive_key(password, salt);
    Aes256Gcm::new_from_slice(key.as_slice()).map_err(|e| ArchiveError::KeyDerivation(e.to_string()))
}
