//! Buffered copy shared by encode and extract.
//!
//! Entry content always streams through a fixed 64 KiB buffer so neither
//! side ever holds a whole file in memory.

use std::io::Read;
use std::io::Write;
use std::io::{self};

/// Size of the copy buffer and of the buffered readers around input files.
pub const COPY_BUFFER_SIZE: usize = 64 * 1024;

/// Reusable heap buffer for [`copy_with_buffer`].
///
/// One buffer is created per worker (or per sequential pass) and reused for
/// every entry it handles.
///
/// # Examples
///
/// ```
/// use gar_core::copy::CopyBuffer;
/// use gar_core::copy::copy_with_buffer;
/// use std::io::Cursor;
///
/// let mut buffer = CopyBuffer::new();
/// let mut output = Vec::new();
/// let copied = copy_with_buffer(&mut Cursor::new(b"payload"), &mut output, &mut buffer)?;
///
/// assert_eq!(copied, 7);
/// assert_eq!(output, b"payload");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CopyBuffer {
    buf: Box<[u8]>,
}

impl CopyBuffer {
    /// Allocates a zeroed buffer of [`COPY_BUFFER_SIZE`] bytes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; COPY_BUFFER_SIZE].into_boxed_slice(),
        }
    }

    /// Returns the buffer size in bytes.
    #[inline]
    #[must_use]
    pub fn size(&self) -> usize {
        self.buf.len()
    }
}

impl Default for CopyBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies `reader` into `writer` through `buffer`, returning the byte count.
///
/// Interrupted reads are retried. Bytes are written in the order they are
/// read.
///
/// # Errors
///
/// Returns the first read or write error. Bytes copied before the failure
/// have already reached `writer`.
#[inline]
pub fn copy_with_buffer<R, W>(reader: &mut R, writer: &mut W, buffer: &mut CopyBuffer) -> io::Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut total: u64 = 0;

    loop {
        let bytes_read = match reader.read(&mut buffer.buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        writer.write_all(&buffer.buf[..bytes_read])?;
        total += bytes_read as u64;
    }

    Ok(total)
}
