//! Archive packing and extraction with password-based encryption.
//!
//! `gar-core` packs a file or directory tree into a zip or tar.gz container
//! and unpacks it again. An optional password wraps the container in
//! chunked AES-256-GCM with a PBKDF2-derived key. Every extracted entry is
//! checked against the output root before anything is written, so crafted
//! names such as `../evil.txt` or `/etc/passwd` are rejected.
//!
//! Zip archives are extracted by a bounded pool of worker threads; tar.gz
//! archives are extracted in stream order.
//!
//! # Examples
//!
//! ```no_run
//! use gar_core::ArchiveOptions;
//! use gar_core::compress;
//! use gar_core::extract;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let options = ArchiveOptions::default().with_password("secret");
//! compress("project", "project.zip", &options)?;
//!
//! let report = extract("project.zip", "/tmp/restore", &options)?;
//! println!("Extracted {} files", report.files_extracted);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod creation;
pub mod crypto;
pub mod error;
pub mod extraction;
pub mod formats;
pub mod io;
pub mod operator;
pub mod report;
pub mod security;
pub mod types;

#[doc(hidden)]
pub mod test_utils;

pub use api::compress;
pub use api::extract;
pub use api::list;
pub use config::ArchiveFormat;
pub use config::ArchiveOptions;
pub use config::CompressionLevel;
pub use config::Password;
pub use error::ArchiveError;
pub use error::ErrorCategory;
pub use error::Result;
pub use operator::Operator;
pub use report::CompressionReport;
pub use report::ExtractionReport;
pub use report::ListedEntry;
pub use types::EntryKind;
