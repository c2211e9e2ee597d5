//! Small single-path helpers.

use anyhow::{Result, bail};
use std::fs::{self, OpenOptions};
use std::path::Path;
use tracing::debug;

use super::helpers::io_error_with_help;

/// Extension of a file name: the text after the last `.`.
///
/// `None` when there is no dot, when the only dot starts the name (`.profile`), or when
/// the name ends with a dot.
pub fn file_extension(name: &str) -> Option<&str> {
    let idx = name.rfind('.')?;
    if idx == 0 || idx + 1 == name.len() {
        return None;
    }
    Some(&name[idx + 1..])
}

/// Make sure `path` exists as a file, creating parents as needed. An existing file is
/// left alone (its modification time does not change).
pub fn touch(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error_with_help("create directory", parent))?;
    }
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(io_error_with_help("create file", path))?;
    Ok(())
}

/// Ensure `path` is a directory, creating it and any missing parents.
pub fn make_folder(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    if path.exists() {
        bail!("'{}' exists and is not a directory", path.display());
    }
    fs::create_dir_all(path).map_err(io_error_with_help("create directory", path))
}

/// Clear the read-only state of `path`. On Unix this adds `u+w`, and `u+x` for
/// directories. Returns whether `path` is writable afterwards; a missing path counts as
/// writable.
pub fn set_writable(path: &Path) -> bool {
    let meta = match fs::metadata(path) {
        Ok(m) => m,
        Err(_) => return !path.exists(),
    };
    let mut perms = meta.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let want = if meta.is_dir() { 0o300 } else { 0o200 };
        let mode = perms.mode();
        if mode & want == want {
            return true;
        }
        perms.set_mode(mode | want);
    }
    #[cfg(not(unix))]
    {
        if !perms.readonly() {
            return true;
        }
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
    }

    if let Err(e) = fs::set_permissions(path, perms) {
        debug!(path = %path.display(), error = %e, "could not make writable");
        return false;
    }
    fs::metadata(path).map(|m| !m.permissions().readonly()).unwrap_or(false)
}
