//! Forced move: rename, then lock release + retry, then copy + delete.
//!
//! A failed rename is the expected first branch, not an error. Only when all three
//! tiers are exhausted does the move report failure, and in that case the source is
//! left where it was.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::io_copy::{Durability, copy_file};
use super::lockers::LockerRegistry;
use super::util::{is_cross_device, rename_and_sync, reserve_temp_in};

type RenameFn = Arc<dyn Fn(&Path, &Path) -> io::Result<()> + Send + Sync>;

/// Moves files, asking registered lockers to let go when a rename is refused.
#[derive(Clone)]
pub struct ForcedMover {
    lockers: Arc<LockerRegistry>,
    durability: Durability,
    rename: RenameFn,
}

impl fmt::Debug for ForcedMover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForcedMover")
            .field("lockers", &self.lockers)
            .field("durability", &self.durability)
            .finish_non_exhaustive()
    }
}

impl ForcedMover {
    pub fn new(lockers: Arc<LockerRegistry>) -> Self {
        Self {
            lockers,
            durability: Durability::default(),
            rename: Arc::new(rename_and_sync),
        }
    }

    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    /// Swap the rename primitive; lets tests make specific renames fail.
    #[cfg(test)]
    pub(crate) fn with_rename<F>(mut self, rename: F) -> Self
    where
        F: Fn(&Path, &Path) -> io::Result<()> + Send + Sync + 'static,
    {
        self.rename = Arc::new(rename);
        self
    }

    pub fn lockers(&self) -> &Arc<LockerRegistry> {
        &self.lockers
    }

    pub fn durability(&self) -> Durability {
        self.durability
    }

    /// Move `src` onto `dst`, replacing `dst` if it is a file. Returns true on success.
    pub fn force_move(&self, src: &Path, dst: &Path) -> bool {
        let first = match (self.rename)(src, dst) {
            Ok(()) => {
                debug!(src = %src.display(), dst = %dst.display(), "renamed directly");
                return true;
            }
            Err(e) => e,
        };
        let hint = if is_cross_device(&first) {
            "cross-filesystem"
        } else {
            "possibly held open"
        };
        debug!(src = %src.display(), error = %first, hint, "direct rename failed; trying lock release");

        // Snapshot taken once: lockers added or removed meanwhile do not affect this call.
        for locker in self.lockers.snapshot() {
            if !locker.release_lock(src) {
                continue;
            }
            match (self.rename)(src, dst) {
                Ok(()) => {
                    info!(src = %src.display(), dst = %dst.display(), "renamed after lock release");
                    return true;
                }
                Err(e) => debug!(src = %src.display(), error = %e, "rename still refused after release"),
            }
        }

        if self.copy_then_delete(src, dst) {
            return true;
        }
        warn!(src = %src.display(), dst = %dst.display(), "move failed: rename, lock release and copy all exhausted");
        false
    }

    /// Copy `src` into a temp sibling of `dst`, commit it with a rename, then remove `src`.
    /// `dst` is never left truncated or half-written.
    fn copy_then_delete(&self, src: &Path, dst: &Path) -> bool {
        if !src.is_file() {
            debug!(src = %src.display(), "copy fallback skipped: source is not a regular file");
            return false;
        }
        let dst_dir = match dst.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let stem = dst
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "move".to_string());
        let tmp = match reserve_temp_in(dst_dir, &stem) {
            Ok(t) => t,
            Err(e) => {
                debug!(dir = %dst_dir.display(), error = %e, "copy fallback: cannot create temp file");
                return false;
            }
        };
        let tmp_path: &Path = &tmp;
        if !copy_file(src, tmp_path, self.durability) {
            debug!(src = %src.display(), "copy fallback: short copy");
            return false;
        }
        if let Err(e) = (self.rename)(tmp_path, dst) {
            debug!(dst = %dst.display(), error = %e, "copy fallback: commit rename failed");
            return false;
        }
        // The temp name no longer exists; disarm its drop-time cleanup.
        let _ = tmp.keep();
        if let Err(e) = std::fs::remove_file(src) {
            warn!(src = %src.display(), error = %e, "copied to destination but could not remove source");
        }
        info!(src = %src.display(), dst = %dst.display(), "moved by copy and delete");
        true
    }
}
