//! Extraction-side safety checks.

pub mod path;
pub mod permissions;

pub use path::PathGuard;
pub use path::validate_path;
pub use permissions::sanitize_mode;
