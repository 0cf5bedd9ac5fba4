//! Validated newtypes used on the extraction path.
//!
//! `DestDir` and `SafePath` can only be built through validation, so a
//! filesystem write that takes them cannot target an unchecked location.

pub mod dest_dir;
pub mod entry_kind;
pub mod safe_path;

pub use dest_dir::DestDir;
pub use entry_kind::EntryKind;
pub use safe_path::SafePath;
