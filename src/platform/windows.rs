//! Windows implementations.
//!
//! Notes:
//! - No POSIX modes; files are created with the directory's inherited ACL.
//! - Trash is the Recycle Bin through `SHFileOperationW` with undo enabled.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::windows::ffi::OsStrExt;
use std::path::Path;
use tempfile::Builder;
use tracing::debug;

use windows_sys::Win32::UI::Shell::{
    FO_DELETE, FOF_ALLOWUNDO, FOF_NOCONFIRMATION, FOF_NOERRORUI, FOF_SILENT, SHFILEOPSTRUCTW,
    SHFileOperationW,
};

use crate::fs_ops::trash::TrashBackend;

/// Open a log file for appending (no symlink defense beyond the ancestor check).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Write `contents` to `path` via a temp sibling and rename. Replaces an existing file.
pub fn write_config_secure_0600(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "config path has no parent"))?;
    std::fs::create_dir_all(parent)
        .with_context(|| format!("create parent '{}'", parent.display()))?;
    let mut tmp = Builder::new()
        .prefix(".fs_guard.config.")
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("create temp in '{}'", parent.display()))?;
    tmp.write_all(contents).context("write temp")?;
    tmp.as_file().sync_all().context("flush temp")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("rename temp -> '{}'", path.display()))?;
    Ok(())
}

#[derive(Debug)]
pub struct RecycleBin;

impl TrashBackend for RecycleBin {
    fn name(&self) -> &'static str {
        "recycle-bin"
    }

    fn move_to_trash(&self, path: &Path) -> io::Result<bool> {
        // pFrom is a list of NUL-terminated names ending with an extra NUL.
        let mut from: Vec<u16> = path.as_os_str().encode_wide().collect();
        from.push(0);
        from.push(0);

        // SAFETY: all-zero is a valid SHFILEOPSTRUCTW (null handles and pointers).
        let mut op: SHFILEOPSTRUCTW = unsafe { std::mem::zeroed() };
        op.wFunc = FO_DELETE;
        op.pFrom = from.as_ptr();
        op.fFlags = (FOF_ALLOWUNDO | FOF_NOCONFIRMATION | FOF_SILENT | FOF_NOERRORUI) as u16;

        // SAFETY: `op` and `from` outlive the call; pTo stays null for FO_DELETE.
        let rc = unsafe { SHFileOperationW(&mut op) };
        if rc != 0 {
            debug!(code = rc, path = %path.display(), "SHFileOperationW failed");
            return Ok(false);
        }
        if op.fAnyOperationsAborted != 0 {
            return Ok(false);
        }
        Ok(!path.exists())
    }
}
