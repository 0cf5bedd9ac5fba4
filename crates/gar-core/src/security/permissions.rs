//! Permission bits restored on extraction.

use std::path::Path;

use crate::Result;

/// Keeps only the owner/group/other rwx bits.
///
/// setuid, setgid and sticky bits recorded in an archive are never applied.
///
/// # Examples
///
/// ```
/// use gar_core::security::sanitize_mode;
///
/// assert_eq!(sanitize_mode(0o104_755), 0o755);
/// assert_eq!(sanitize_mode(0o6644), 0o644);
/// ```
#[must_use]
pub const fn sanitize_mode(mode: u32) -> u32 {
    mode & 0o777
}

/// Applies a sanitized mode to an extracted file (Unix only).
///
/// # Errors
///
/// Returns an error if `chmod` fails.
#[cfg(unix)]
pub fn apply_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(sanitize_mode(mode)))?;
    Ok(())
}

/// Permission bits are not restored on this platform.
///
/// # Errors
///
/// Never fails.
#[cfg(not(unix))]
pub fn apply_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_mode_strips_special_bits() {
        assert_eq!(sanitize_mode(0o4755), 0o755);
        assert_eq!(sanitize_mode(0o2755), 0o755);
        assert_eq!(sanitize_mode(0o1777), 0o777);
        assert_eq!(sanitize_mode(0o100_644), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_apply_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::TempDir::new().unwrap();
        let file = temp.path().join("script.sh");
        std::fs::write(&file, "#!/bin/sh\n").unwrap();

        apply_mode(&file, 0o104_750).unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o7777, 0o750);
    }
}
