//! Password-based authenticated encryption around the container bytes.
//!
//! Layout of an encrypted archive:
//!
//! ```text
//! [salt: 32][nonce: 12][frame]...[final frame]
//! frame = [flag: u8][len: u32 LE][ciphertext + 16-byte tag]
//! ```
//!
//! Plaintext is cut into chunks of at most 64 KiB. Chunk `i` is sealed with
//! the header nonce whose last eight bytes are XOR-ed with `i` (big-endian),
//! so no nonce is ever used twice under one key. The flag (1 on the last
//! chunk, 0 otherwise) is bound as associated data; a stream that stops
//! before a flagged chunk, or continues after one, fails authentication.

pub mod key;
pub mod stream;

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

pub use key::StreamHeader;
pub use key::derive_key;
pub use stream::DecryptingReader;
pub use stream::EncryptingWriter;

/// Marker carried inside `io::Error` when a chunk fails authentication.
///
/// `io::Read` can only return `io::Error`, so the decrypting reader wraps
/// this marker; [`is_authentication_failure`] recovers it after the error
/// has passed through gzip, tar or zip decoding.
#[derive(Debug, Error)]
#[error("authentication failed: wrong password or corrupted data")]
pub struct AuthenticationFailed;

pub(crate) fn authentication_error() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, AuthenticationFailed)
}

/// Returns `true` if `err`, or any error it wraps, is an
/// [`AuthenticationFailed`] marker.
#[must_use]
pub fn is_authentication_failure(err: &io::Error) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> =
        err.get_ref().map(|inner| inner as &(dyn StdError + 'static));

    while let Some(e) = current {
        if e.is::<AuthenticationFailed>() {
            return true;
        }
        current = match e.downcast_ref::<io::Error>() {
            Some(io_err) => io_err.get_ref().map(|inner| inner as &(dyn StdError + 'static)),
            None => e.source(),
        };
    }

    false
}
