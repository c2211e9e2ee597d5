use std::fs::File;
use std::io;
use std::path::Path;

use tempfile::{Builder, TempPath};

use super::helpers::io_error_with_help_io;

/// Rename `src` to `dst`, then fsync the destination directory (Unix, best-effort).
/// `std::fs::rename` replaces an existing destination file on every platform.
pub(crate) fn rename_and_sync(src: &Path, dst: &Path) -> io::Result<()> {
    std::fs::rename(src, dst)?;
    if let Some(parent) = dst.parent() {
        // A failed directory fsync must not turn a completed rename into a failure.
        let _ = fsync_dir(parent);
    }
    Ok(())
}

/// Reserve a uniquely named hidden temp file inside `dir`. The file is closed; it is
/// deleted when the returned `TempPath` drops unless `keep()` is called.
pub(crate) fn reserve_temp_in(dir: &Path, stem: &str) -> io::Result<TempPath> {
    let prefix = format!(".fs_guard.{stem}.");
    let file = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_error_with_help_io("create temp file in", dir))?;
    Ok(file.into_temp_path())
}

pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    // std::io::ErrorKind has no CrossDeviceLink variant on stable platforms,
    // so detect EXDEV / ERROR_NOT_SAME_DEVICE via raw OS error codes.
    if let Some(code) = e.raw_os_error() {
        #[cfg(unix)]
        {
            if code == libc::EXDEV {
                return true;
            }
        }
        #[cfg(windows)]
        {
            // ERROR_NOT_SAME_DEVICE
            if code == 17 {
                return true;
            }
        }
    }
    false
}

#[cfg(unix)]
pub(crate) fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(windows)]
pub(crate) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rename_replaces_existing() {
        let td = tempdir().unwrap();
        let a = td.path().join("a");
        let b = td.path().join("b");
        fs::write(&a, b"new").unwrap();
        fs::write(&b, b"old").unwrap();
        rename_and_sync(&a, &b).unwrap();
        assert!(!a.exists());
        assert_eq!(fs::read(&b).unwrap(), b"new");
    }

    #[test]
    fn reserved_temp_is_removed_on_drop() {
        let td = tempdir().unwrap();
        let tmp = reserve_temp_in(td.path(), "x").unwrap();
        let p = tmp.to_path_buf();
        assert!(p.exists());
        let name = p.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".fs_guard.x.") && name.ends_with(".tmp"));
        drop(tmp);
        assert!(!p.exists());
    }

    #[test]
    fn temp_in_missing_dir_names_the_dir() {
        let td = tempdir().unwrap();
        let missing = td.path().join("absent");
        let err = reserve_temp_in(&missing, "x").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("create temp file in"));
        assert!(err.to_string().contains("absent"));
    }

    #[test]
    fn not_found_is_not_cross_device() {
        assert!(!is_cross_device(&io::Error::from(io::ErrorKind::NotFound)));
    }
}
