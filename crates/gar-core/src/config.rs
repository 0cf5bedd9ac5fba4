//! Operator configuration.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::Path;
use std::str::FromStr;
use std::thread;

use zeroize::Zeroizing;

use crate::ArchiveError;
use crate::Result;

/// Container format of an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArchiveFormat {
    /// ZIP with a central directory; supports random access.
    #[default]
    Zip,
    /// Gzip-compressed POSIX tar; strictly sequential.
    TarGz,
}

impl ArchiveFormat {
    /// Guesses the format from a file name extension.
    ///
    /// Returns `None` when the extension is not recognized.
    ///
    /// # Examples
    ///
    /// ```
    /// use gar_core::ArchiveFormat;
    /// use std::path::Path;
    ///
    /// assert_eq!(
    ///     ArchiveFormat::from_path(Path::new("backup.tar.gz")),
    ///     Some(ArchiveFormat::TarGz)
    /// );
    /// assert_eq!(
    ///     ArchiveFormat::from_path(Path::new("docs.ZIP")),
    ///     Some(ArchiveFormat::Zip)
    /// );
    /// assert_eq!(ArchiveFormat::from_path(Path::new("notes.txt")), None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    /// Canonical file extension, without the leading dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }

    /// Returns `true` if entries can be read independently.
    #[must_use]
    pub const fn supports_random_access(self) -> bool {
        matches!(self, Self::Zip)
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArchiveFormat {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "tar.gz" | "tgz" | "targz" => Ok(Self::TarGz),
            _ => Err(ArchiveError::UnsupportedFormat),
        }
    }
}

/// Compression effort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressionLevel {
    /// Favour speed over ratio.
    Fastest,
    /// Balanced default.
    #[default]
    Normal,
    /// Favour ratio over speed.
    Best,
}

impl CompressionLevel {
    /// Numeric deflate level (1, 6 or 9) shared by both formats.
    #[must_use]
    pub const fn deflate_level(self) -> u32 {
        match self {
            Self::Fastest => 1,
            Self::Normal => 6,
            Self::Best => 9,
        }
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fastest => "fastest",
            Self::Normal => "normal",
            Self::Best => "best",
        })
    }
}

impl FromStr for CompressionLevel {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fastest" | "fast" => Ok(Self::Fastest),
            "normal" | "default" => Ok(Self::Normal),
            "best" => Ok(Self::Best),
            other => Err(ArchiveError::InvalidConfiguration {
                reason: format!("unknown compression level '{other}'"),
            }),
        }
    }
}

/// Secret used to derive the archive key.
///
/// The bytes are wiped on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wraps a password string.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret.into()))
    }

    /// Raw password bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Returns `true` for a zero-length password.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl From<&str> for Password {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Password {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Options shared by compress, extract and list.
///
/// `format` and `compression_level` only affect compression; extraction
/// and listing detect the format from the archive content.
///
/// # Examples
///
/// ```
/// use gar_core::ArchiveFormat;
/// use gar_core::ArchiveOptions;
/// use gar_core::CompressionLevel;
///
/// let options = ArchiveOptions::default()
///     .with_format(ArchiveFormat::TarGz)
///     .with_compression_level(CompressionLevel::Best)
///     .with_password("s3cret")
///     .with_worker_count(2);
///
/// assert!(options.validate().is_ok());
/// assert!(options.is_encrypted());
/// ```
#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    /// Container format used when compressing.
    pub format: ArchiveFormat,

    /// Compression effort used when compressing.
    pub compression_level: CompressionLevel,

    /// Enables encryption on compress and requires decryption on
    /// extract/list.
    pub password: Option<Password>,

    /// Maximum number of concurrent entry extractions.
    pub worker_count: usize,

    /// Emit per-entry log lines.
    pub verbose: bool,
}

impl Default for ArchiveOptions {
    /// Zip, normal compression, no password, one worker per available CPU.
    fn default() -> Self {
        Self {
            format: ArchiveFormat::default(),
            compression_level: CompressionLevel::default(),
            password: None,
            worker_count: default_worker_count(),
            verbose: false,
        }
    }
}

impl ArchiveOptions {
    /// Sets the container format.
    #[must_use]
    pub fn with_format(mut self, format: ArchiveFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the compression effort.
    #[must_use]
    pub fn with_compression_level(mut self, level: CompressionLevel) -> Self {
        self.compression_level = level;
        self
    }

    /// Enables encryption with the given password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<Password>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Enables per-entry logging.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns `true` when a password is configured.
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        self.password.is_some()
    }

    /// Checks the options before any filesystem work starts.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `worker_count` is zero or the
    /// password is empty.
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(ArchiveError::InvalidConfiguration {
                reason: "worker_count must be at least 1".to_string(),
            });
        }

        if self.password.as_ref().is_some_and(Password::is_empty) {
            return Err(ArchiveError::InvalidConfiguration {
                reason: "password must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

fn default_worker_count() -> usize {
    thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ArchiveOptions::default();
        assert_eq!(options.format, ArchiveFormat::Zip);
        assert_eq!(options.compression_level, CompressionLevel::Normal);
        assert!(options.password.is_none());
        assert!(options.worker_count >= 1);
        assert!(!options.verbose);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = ArchiveOptions::default()
            .with_worker_count(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_empty_password_rejected() {
        let err = ArchiveOptions::default()
            .with_password("")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_password_debug_is_redacted() {
        let options = ArchiveOptions::default().with_password("hunter2");
        let rendered = format!("{options:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("Password(***)"));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("zip".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::Zip);
        assert_eq!(
            "TAR.GZ".parse::<ArchiveFormat>().unwrap(),
            ArchiveFormat::TarGz
        );
        assert_eq!("tgz".parse::<ArchiveFormat>().unwrap(), ArchiveFormat::TarGz);
        assert!("7z".parse::<ArchiveFormat>().is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(
            ArchiveFormat::from_path(Path::new("/tmp/out.tgz")),
            Some(ArchiveFormat::TarGz)
        );
        assert_eq!(
            ArchiveFormat::from_path(Path::new("out.zip")),
            Some(ArchiveFormat::Zip)
        );
        assert_eq!(ArchiveFormat::from_path(Path::new("out.tar")), None);
        assert_eq!(ArchiveFormat::from_path(Path::new("/")), None);
    }

    #[test]
    fn test_compression_level_mapping() {
        assert_eq!(CompressionLevel::Fastest.deflate_level(), 1);
        assert_eq!(CompressionLevel::Normal.deflate_level(), 6);
        assert_eq!(CompressionLevel::Best.deflate_level(), 9);
        assert_eq!(
            "best".parse::<CompressionLevel>().unwrap(),
            CompressionLevel::Best
        );
        assert!("ultra".parse::<CompressionLevel>().is_err());
    }
}
