//! Whole-tree operations: listing, copying, deleting, sizing, overlap checks.
//!
//! `delete_tree` re-resolves every child before touching it and refuses anything whose
//! canonical path has left the root, so a symlink inside the tree can never redirect the
//! deletion elsewhere.

use anyhow::{Context, Result, bail};
use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace, warn};
use walkdir::WalkDir;

use super::fsutil::file_extension;
use super::helpers::io_error_with_help;
use super::io_copy::{Durability, copy_file};
use super::resolve::{canonicalize, starts_with_str};

/// All regular files under `root`, breadth-first.
///
/// With a non-empty `extensions` filter only files whose extension matches one entry
/// (ignoring ASCII case) are returned. Directories are listed at most once each, so a
/// symlink loop cannot repeat them. A `root` that is not a directory yields nothing.
pub fn enumerate<S: AsRef<str>>(root: &Path, extensions: &[S]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if !root.is_dir() {
        return out;
    }

    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut queue: VecDeque<PathBuf> = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(dir) = queue.pop_front() {
        let key = dunce::canonicalize(&dir).unwrap_or_else(|_| dir.clone());
        if !visited.insert(key) {
            trace!(dir = %dir.display(), "already listed; skipping");
            continue;
        }
        let entries = match fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(e) => {
                debug!(dir = %dir.display(), error = %e, "cannot list directory");
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            // `is_dir`/`is_file` follow symlinks.
            if path.is_dir() {
                queue.push_back(path);
            } else if path.is_file() && matches_filter(&path, extensions) {
                out.push(path);
            }
        }
    }
    out
}

fn matches_filter<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    let Some(ext) = path.file_name().and_then(|n| n.to_str()).and_then(file_extension) else {
        return false;
    };
    extensions.iter().any(|want| want.as_ref().eq_ignore_ascii_case(ext))
}

/// Copy the directory `src` to a new directory `dst`.
///
/// Fails if `src` is not a directory or `dst` already exists. Symlinks inside the tree
/// are skipped, not followed. The first failure aborts the copy; whatever was copied
/// until then stays.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    copy_tree_with(src, dst, Durability::default())
}

pub fn copy_tree_with(src: &Path, dst: &Path, mode: Durability) -> Result<()> {
    if !src.is_dir() {
        bail!("source '{}' is not a directory", src.display());
    }
    if dst.exists() {
        bail!("destination '{}' already exists", dst.display());
    }
    copy_dir_contents(src, dst, mode)?;
    info!(src = %src.display(), dst = %dst.display(), "tree copied");
    Ok(())
}

/// Parents are yielded before their contents, so every file lands in an existing directory.
fn copy_dir_contents(src: &Path, dst: &Path, mode: Durability) -> Result<()> {
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("walk '{}'", src.display()))?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("'{}' is outside '{}'", entry.path().display(), src.display()))?;
        let to = if rel.as_os_str().is_empty() {
            dst.to_path_buf()
        } else {
            dst.join(rel)
        };
        let ft = entry.file_type();
        if ft.is_dir() {
            fs::create_dir_all(&to).map_err(io_error_with_help("create directory", &to))?;
        } else if ft.is_symlink() {
            warn!(path = %entry.path().display(), "copy: skipping symlink");
        } else if !copy_file(entry.path(), &to, mode) {
            bail!("copy '{}' -> '{}' came up short", entry.path().display(), to.display());
        }
    }
    Ok(())
}

/// Delete `root` and everything inside it.
///
/// Children whose canonical path does not start with the root's canonical path are left
/// alone; the root then cannot be removed and the call reports false. Symlinks that pass
/// the check are unlinked, never followed. Stops at the first failure.
pub fn delete_tree(root: &Path) -> bool {
    let root_real = match canonicalize(root) {
        Ok(p) => p,
        Err(e) => {
            debug!(root = %root.display(), error = %e, "delete: cannot resolve root");
            return false;
        }
    };
    let ok = delete_within(root, &root_real);
    if ok {
        info!(root = %root.display(), "deleted");
    }
    ok
}

fn delete_within(path: &Path, root_real: &Path) -> bool {
    let meta = match fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "delete: cannot stat");
            return false;
        }
    };
    if !meta.is_dir() {
        return remove_logged(path, fs::remove_file(path));
    }

    let entries = match fs::read_dir(path) {
        Ok(rd) => rd,
        Err(e) => {
            debug!(dir = %path.display(), error = %e, "delete: cannot list");
            return false;
        }
    };
    for entry in entries {
        let child = match entry {
            Ok(e) => e.path(),
            Err(e) => {
                debug!(dir = %path.display(), error = %e, "delete: bad directory entry");
                return false;
            }
        };
        let child_real = match canonicalize(&child) {
            Ok(p) => p,
            Err(e) => {
                debug!(path = %child.display(), error = %e, "delete: cannot resolve child");
                return false;
            }
        };
        if !starts_with_str(&child_real, root_real) {
            warn!(
                path = %child.display(),
                resolved = %child_real.display(),
                root = %root_real.display(),
                "delete: child resolves outside the tree; leaving it"
            );
            continue;
        }
        if !delete_within(&child, root_real) {
            return false;
        }
    }
    remove_logged(path, fs::remove_dir(path))
}

fn remove_logged(path: &Path, res: std::io::Result<()>) -> bool {
    match res {
        Ok(()) => {
            trace!(path = %path.display(), "removed");
            true
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "delete: remove failed");
            false
        }
    }
}

/// Length of a file, or the summed length of every file under a directory.
pub fn total_size(root: &Path) -> u64 {
    if !root.is_dir() {
        return fs::metadata(root).map(|m| m.len()).unwrap_or(0);
    }
    WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

/// True if `a` and `b` are the same path, or one of them (or a file under it) is also a
/// file under the other.
pub fn conflicts(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    let none: &[&str] = &[];
    let (under_a, under_b) = rayon::join(|| enumerate(a, none), || enumerate(b, none));

    let mut seen: HashSet<&Path> = under_a.iter().map(PathBuf::as_path).collect();
    seen.insert(a);
    if seen.contains(b) {
        return true;
    }
    under_b.iter().any(|f| seen.contains(f.as_path()))
}
