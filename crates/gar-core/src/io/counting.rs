//! Byte-counting writer.

use std::io::Write;
use std::io::{self};

/// Writer adaptor that counts the bytes accepted by the inner writer.
///
/// Wrapped around the archive sink so the compress report can state the
/// final archive size, including any encryption header and framing.
///
/// # Examples
///
/// ```
/// use gar_core::io::CountingWriter;
/// use std::io::Write;
///
/// let mut writer = CountingWriter::new(Vec::new());
/// writer.write_all(b"salt")?;
/// writer.write_all(b"nonce")?;
///
/// assert_eq!(writer.total_bytes(), 9);
/// assert_eq!(writer.into_inner(), b"saltnonce");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct CountingWriter<W> {
    inner: W,
    bytes_written: u64,
}

impl<W> CountingWriter<W> {
    /// Wraps `inner` with a zeroed counter.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Bytes successfully written so far.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.bytes_written
    }

    /// Returns the inner writer.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let bytes = self.inner.write(buf)?;
        self.bytes_written += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_writer_basic() {
        let mut writer = CountingWriter::new(Vec::new());

        writer.write_all(b"Hello").unwrap();
        assert_eq!(writer.total_bytes(), 5);

        write!(writer, ", {}!", "World").unwrap();
        assert_eq!(writer.total_bytes(), 13);
        assert_eq!(writer.into_inner(), b"Hello, World!");
    }

    #[test]
    fn test_counting_writer_partial_write() {
        struct LimitedWriter(Vec<u8>);

        impl Write for LimitedWriter {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                let n = buf.len().min(3);
                self.0.extend_from_slice(&buf[..n]);
                Ok(n)
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut writer = CountingWriter::new(LimitedWriter(Vec::new()));
        assert_eq!(writer.write(b"hello").unwrap(), 3);
        assert_eq!(writer.total_bytes(), 3);
    }
}
