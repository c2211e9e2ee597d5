//! Unix implementations (Linux, BSD, macOS).

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::Path;
use tempfile::Builder;

/// Open a log file for appending. A newly created file gets 0600; an existing file keeps
/// whatever mode it has.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)?;
    if !existed {
        // umask may have stripped bits from the create mode; pin it.
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}

/// Write `contents` to `path` atomically with mode 0600: temp sibling, fsync, rename,
/// fsync parent. Replaces an existing file. No temp file survives a failure.
pub fn write_config_secure_0600(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no parent"))?;
    fs::create_dir_all(parent).with_context(|| format!("create parent '{}'", parent.display()))?;

    let mut tmp = Builder::new()
        .prefix(".fs_guard.config.")
        .suffix(".tmp")
        .permissions(fs::Permissions::from_mode(0o600))
        .tempfile_in(parent)
        .with_context(|| format!("create temp in '{}'", parent.display()))?;
    tmp.write_all(contents).context("write temp")?;
    tmp.as_file().sync_all().context("fsync temp")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("rename temp -> '{}'", path.display()))?;

    let dir = File::open(parent).with_context(|| format!("open dir '{}'", parent.display()))?;
    dir.sync_all().context("fsync parent dir")?;
    Ok(())
}
