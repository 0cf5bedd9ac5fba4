//! Clone-able random-access byte source.
//!
//! A parsed zip index is cloned into every extraction worker. Each clone
//! needs its own read position over the same bytes, so the source keeps a
//! private offset and reads positionally instead of sharing a file cursor.

use std::fs::File;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::io::{self};
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Backing {
    File { file: Arc<File>, len: u64 },
    Memory(Arc<[u8]>),
}

/// Read + Seek view over a file or an in-memory buffer.
///
/// Clones share the underlying bytes and keep independent positions.
///
/// # Examples
///
/// ```
/// use gar_core::io::SharedSource;
/// use std::io::Read;
/// use std::io::Seek;
/// use std::io::SeekFrom;
///
/// let mut a = SharedSource::from_bytes(b"abcdef".to_vec());
/// let mut b = a.clone();
///
/// a.seek(SeekFrom::Start(3))?;
/// let mut head = [0u8; 2];
/// b.read_exact(&mut head)?;
/// let mut tail = String::new();
/// a.read_to_string(&mut tail)?;
///
/// assert_eq!(&head, b"ab");
/// assert_eq!(tail, "def");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SharedSource {
    backing: Backing,
    position: u64,
}

impl SharedSource {
    /// Wraps an open file. The file's own cursor is never used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file length cannot be read.
    pub fn from_file(file: File) -> io::Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            backing: Backing::File {
                file: Arc::new(file),
                len,
            },
            position: 0,
        })
    }

    /// Wraps an in-memory buffer.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            backing: Backing::Memory(bytes.into()),
            position: 0,
        }
    }

    /// Total length of the source in bytes.
    #[must_use]
    pub fn len(&self) -> u64 {
        match &self.backing {
            Backing::File { len, .. } => *len,
            Backing::Memory(bytes) => bytes.len() as u64,
        }
    }

    /// Returns `true` if the source holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Read for SharedSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = match &self.backing {
            Backing::File { file, len } => {
                if self.position >= *len {
                    return Ok(0);
                }
                read_at(file, buf, self.position)?
            }
            Backing::Memory(bytes) => {
                let Ok(start) = usize::try_from(self.position) else {
                    return Ok(0);
                };
                let Some(remaining) = bytes.get(start..) else {
                    return Ok(0);
                };
                let n = remaining.len().min(buf.len());
                buf[..n].copy_from_slice(&remaining[..n]);
                n
            }
        };

        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for SharedSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::End(offset) => self.len().checked_add_signed(offset),
            SeekFrom::Current(offset) => self.position.checked_add_signed(offset),
        };

        let target = target.ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek to a negative or overflowing position",
            )
        })?;
        self.position = target;
        Ok(target)
    }

    fn stream_position(&mut self) -> io::Result<u64> {
        Ok(self.position)
    }
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::unix::fs::FileExt;

    loop {
        match file.read_at(buf, offset) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            other => return other,
        }
    }
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    use std::os::windows::fs::FileExt;

    file.seek_read(buf, offset)
}
