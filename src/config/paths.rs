//! Default config/log locations and the symlinked-ancestor check.

use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file (or a directory holding `config.xml`).
pub const CONFIG_ENV: &str = "FS_GUARD_CONFIG";

const APP_DIR: &str = "fs_guard";
const CONFIG_FILE: &str = "config.xml";

/// Config file location: `$FS_GUARD_CONFIG` when set, else the per-user config directory.
///
/// A relative `$FS_GUARD_CONFIG` is taken relative to the current directory; one that
/// names an existing directory means `config.xml` inside it.
pub fn default_config_path() -> Option<PathBuf> {
    if let Some(raw) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        let mut p = PathBuf::from(raw);
        if p.is_relative() {
            p = env::current_dir().ok()?.join(p);
        }
        if p.is_dir() {
            p.push(CONFIG_FILE);
        }
        return Some(p);
    }
    match config_dir() {
        Some(base) => Some(base.join(APP_DIR).join(CONFIG_FILE)),
        None => env::var_os("HOME").map(|h| PathBuf::from(h).join(".config").join(APP_DIR).join(CONFIG_FILE)),
    }
}

/// Suggested log file location in the per-user data directory. Nothing is created.
pub fn default_log_path() -> Option<PathBuf> {
    let base = data_dir().or_else(|| env::var_os("HOME").map(|h| PathBuf::from(h).join(".local").join("share")))?;
    Some(base.join(APP_DIR).join("fs_guard.log"))
}

/// True if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    for anc in path.ancestors().skip(1) {
        if anc.as_os_str().is_empty() {
            continue;
        }
        match fs::symlink_metadata(anc) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn plain_ancestors_are_not_symlinks() {
        let td = tempdir().unwrap();
        let real = dunce::canonicalize(td.path()).unwrap();
        assert!(!path_has_symlink_ancestor(&real.join("a/b/log.txt")).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_ancestor_is_detected() {
        let td = tempdir().unwrap();
        let real = td.path().join("real");
        fs::create_dir(&real).unwrap();
        let link = td.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        assert!(path_has_symlink_ancestor(&link.join("log.txt")).unwrap());
        assert!(path_has_symlink_ancestor(&link.join("missing/log.txt")).unwrap());
    }

    #[test]
    fn log_path_is_inside_app_dir() {
        if let Some(p) = default_log_path() {
            assert!(p.ends_with("fs_guard/fs_guard.log"));
        }
    }
}
