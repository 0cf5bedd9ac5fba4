//! Test utilities for building archives in memory.
//!
//! Unlike the codecs, these helpers write entry names verbatim, so tests can
//! produce hostile archives (`../evil.txt`, absolute names) on purpose.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

/// Gzip-compressed tar builder handed to [`create_test_tar_gz_with`].
pub type TestTarBuilder = tar::Builder<GzEncoder<Vec<u8>>>;

/// Creates an in-memory tar.gz archive of regular files.
///
/// Names go straight into the header, bypassing the `..` check the `tar`
/// crate applies to `append_data` paths.
///
/// # Examples
///
/// ```
/// use gar_core::test_utils::create_test_tar_gz;
///
/// let data = create_test_tar_gz(&[("file.txt", b"hello"), ("../escape.txt", b"x")]);
/// assert_eq!(&data[..2], &[0x1F, 0x8B]);
/// ```
#[must_use]
pub fn create_test_tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
    create_test_tar_gz_with(|builder| {
        for (name, data) in entries {
            append_raw(builder, name, tar::EntryType::Regular, data);
        }
    })
}

/// Creates an in-memory tar.gz archive, letting `fill` append entries.
#[must_use]
pub fn create_test_tar_gz_with(fill: impl FnOnce(&mut TestTarBuilder)) -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    fill(&mut builder);
    builder.into_inner().unwrap().finish().unwrap()
}

/// Appends an entry whose name is copied byte-for-byte into the header.
///
/// `name` must fit the 100-byte v7 name field.
pub fn append_raw(builder: &mut TestTarBuilder, name: &str, entry_type: tar::EntryType, data: &[u8]) {
    let mut header = tar::Header::new_gnu();
    let field = &mut header.as_old_mut().name;
    assert!(name.len() < field.len(), "test entry name too long");
    field[..name.len()].copy_from_slice(name.as_bytes());
    header.set_entry_type(entry_type);
    header.set_size(data.len() as u64);
    header.set_mode(if entry_type == tar::EntryType::Directory {
        0o755
    } else {
        0o644
    });
    header.set_cksum();
    builder.append(&header, data).unwrap();
}

/// Creates an in-memory zip archive of deflated files.
///
/// A name ending in `/` becomes a directory entry.
///
/// # Examples
///
/// ```
/// use gar_core::test_utils::create_test_zip;
///
/// let data = create_test_zip(&[("dir/", b""), ("dir/nested.txt", b"world")]);
/// assert_eq!(&data[..2], b"PK");
/// ```
#[must_use]
pub fn create_test_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use zip::write::SimpleFileOptions;
    use zip::write::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options.unix_permissions(0o755)).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
    }

    zip.finish().unwrap().into_inner()
}

/// Creates a zip archive whose entry is marked as a Unix symlink.
#[must_use]
pub fn create_test_zip_symlink(name: &str, target: &str) -> Vec<u8> {
    use zip::write::SimpleFileOptions;
    use zip::write::ZipWriter;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.add_symlink(name, target, SimpleFileOptions::default())
        .unwrap();
    zip.finish().unwrap().into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_raw_tar_keeps_dotdot_name() {
        let data = create_test_tar_gz(&[("../evil.txt", b"pwned")]);
        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(&data[..]));
        let mut entry = archive.entries().unwrap().next().unwrap().unwrap();
        assert_eq!(&*entry.path_bytes(), b"../evil.txt");

        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "pwned");
    }

    #[test]
    fn test_zip_keeps_names() {
        let data = create_test_zip(&[("../evil.txt", b"x"), ("d/", b"")]);
        let archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
        let names: Vec<_> = archive.file_names().collect();
        assert!(names.contains(&"../evil.txt"));
        assert!(names.contains(&"d/"));
    }
}
