//! Materializing validated entries on disk.

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use log::debug;

use crate::Result;
use crate::copy::COPY_BUFFER_SIZE;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::formats::decode_error;
use crate::security::permissions::apply_mode;

/// Writes `reader` to `target`, replacing any existing file.
///
/// Parent directories are created as needed. If the copy fails the partial
/// file is removed. `mode`, when present, is applied after a successful
/// write with setuid/setgid/sticky bits stripped.
///
/// `target` must already have passed the path guard.
///
/// # Errors
///
/// Returns `Io` on create/write failures, `InvalidArchive` for corrupt
/// compressed data and `Authentication` for a failed ciphertext tag.
pub fn write_file<R: Read + ?Sized>(
    reader: &mut R,
    target: &Path,
    mode: Option<u32>,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    #[cfg(test)]
    let _active = in_flight::enter(target);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, File::create(target)?);
    let copied = copy_with_buffer(reader, &mut writer, buffer).and_then(|n| {
        writer.flush()?;
        Ok(n)
    });

    let written = match copied {
        Ok(n) => n,
        Err(e) => {
            drop(writer);
            if let Err(cleanup) = fs::remove_file(target) {
                debug!("could not remove partial {}: {cleanup}", target.display());
            }
            return Err(decode_error(e));
        }
    };

    if let Some(mode) = mode {
        apply_mode(target, mode)?;
    }

    Ok(written)
}

/// Creates `target` and any missing parents. Existing directories are fine.
///
/// # Errors
///
/// Returns `Io` if creation fails, including when a file is in the way.
pub fn create_directory(target: &Path) -> Result<()> {
    fs::create_dir_all(target)?;
    Ok(())
}


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;
    use tempfile::TempDir;

    struct FailingReader {
        served: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.served {
                return Err(io::Error::new(io::ErrorKind::InvalidData, "corrupt"));
            }
            self.served = true;
            buf[..4].copy_from_slice(b"part");
            Ok(4)
        }
    }

    #[test]
    fn test_write_file_creates_parents() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("a/b/c.txt");
        let mut buffer = CopyBuffer::new();

        let written = write_file(&mut &b"content"[..], &target, None, &mut buffer).unwrap();
        assert_eq!(written, 7);
        assert_eq!(fs::read_to_string(&target).unwrap(), "content");
    }

    #[test]
    fn test_write_file_overwrites() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("f.txt");
        fs::write(&target, "a much longer previous content").unwrap();
        let mut buffer = CopyBuffer::new();

        write_file(&mut &b"new"[..], &target, None, &mut buffer).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
    }

    #[test]
    fn test_failed_copy_removes_partial_file() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("partial.bin");
        let mut buffer = CopyBuffer::new();

        let result = write_file(&mut FailingReader { served: false }, &target, None, &mut buffer);
        assert!(result.is_err());
        assert!(!target.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_mode_applied_without_special_bits() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let target = temp.path().join("tool");
        let mut buffer = CopyBuffer::new();

        write_file(&mut &b"#!"[..], &target, Some(0o104_755), &mut buffer).unwrap();
        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o755);
    }

    #[test]
    fn test_in_flight_counts_nested_writes() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        in_flight::watch(&root);

        let first = in_flight::enter(&root.join("a.txt"));
        let second = in_flight::enter(&root.join("b/c.txt"));
        drop(first);
        drop(second);
        let _third = in_flight::enter(&root.join("d.txt"));

        assert_eq!(in_flight::peak(&root), 2);
    }

    #[test]
    fn test_create_directory_idempotent() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("x/y");
        create_directory(&target).unwrap();
        create_directory(&target).unwrap();
        assert!(target.is_dir());
    }
}
