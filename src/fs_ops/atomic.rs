//! Save-and-verify writes.
//!
//! Steps:
//! - create a uniquely named temp file inside the target directory (same filesystem,
//!   so the final move is a plain rename);
//! - write and flush everything, fsync in `Durability::Full`;
//! - read the temp file back and compare it byte-for-byte;
//! - only on an exact match hand it to the [`ForcedMover`] for the final move.
//!
//! The destination is either untouched or holds exactly the new bytes. The temp file
//! is removed on every failure path.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tempfile::TempPath;
use tracing::{debug, info, warn};

use super::force_move::ForcedMover;
use super::io_copy::Durability;
use super::util::reserve_temp_in;

/// Durable writer for settings and state files.
#[derive(Debug, Clone)]
pub struct AtomicWriter {
    mover: ForcedMover,
}

impl AtomicWriter {
    pub fn new(mover: ForcedMover) -> Self {
        Self { mover }
    }

    pub fn mover(&self) -> &ForcedMover {
        &self.mover
    }

    /// Write `data` to `directory/name` only if it can be verified on disk first.
    /// Returns false (destination untouched) on any failure.
    pub fn save_verified(&self, directory: &Path, name: &str, data: &[u8]) -> bool {
        self.save_verified_with(directory, name, data, |_| {})
    }

    /// Same as [`save_verified`](Self::save_verified) with a hook that runs between the
    /// write and the read-back.
    pub(crate) fn save_verified_with<F>(&self, directory: &Path, name: &str, data: &[u8], before_verify: F) -> bool
    where
        F: FnOnce(&Path),
    {
        let tmp = match reserve_temp_in(directory, name) {
            Ok(t) => t,
            Err(e) => {
                debug!(dir = %directory.display(), error = %e, "save: cannot create temp file");
                return false;
            }
        };

        let tmp_path: &Path = &tmp;
        if let Err(e) = write_all_to(tmp_path, data, self.mover.durability()) {
            debug!(tmp = %tmp.display(), error = %e, "save: write to temp failed");
            return false;
        }

        before_verify(tmp_path);

        match read_file_fully(tmp_path) {
            Some(read) if read == data => {}
            Some(_) => {
                warn!(tmp = %tmp.display(), "save: read-back does not match; destination left untouched");
                return false;
            }
            None if data.is_empty() => {
                // An empty payload reads back as "nothing"; confirm the temp really is empty.
                match std::fs::metadata(tmp_path) {
                    Ok(m) if m.len() == 0 => {}
                    _ => {
                        warn!(tmp = %tmp.display(), "save: empty payload did not verify");
                        return false;
                    }
                }
            }
            None => {
                warn!(tmp = %tmp.display(), "save: read-back failed; destination left untouched");
                return false;
            }
        }

        let dest = directory.join(name);
        if !self.mover.force_move(tmp_path, &dest) {
            warn!(dest = %dest.display(), "save: verified data could not be moved into place");
            return false;
        }
        release_temp(tmp);
        info!(dest = %dest.display(), bytes = data.len(), "saved and verified");
        true
    }
}

/// Disarm the temp guard once the file has moved away. If a copy-based move left it
/// behind, the guard stays armed and removes it on drop.
fn release_temp(tmp: TempPath) {
    if std::fs::symlink_metadata(&tmp).is_ok() {
        debug!(tmp = %tmp.display(), "save: temp still present after move; removing");
        return;
    }
    let _ = tmp.keep();
}

fn write_all_to(path: &Path, data: &[u8], mode: Durability) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(data)?;
    f.flush()?;
    if matches!(mode, Durability::Full) {
        f.sync_all()?;
    }
    Ok(())
}

/// Read a whole file. `None` if it is empty, missing, or cannot be read in full.
pub fn read_file_fully(path: &Path) -> Option<Vec<u8>> {
    let file = File::open(path).ok()?;
    let len = file.metadata().ok()?.len();
    if len == 0 {
        return None;
    }
    let mut data = Vec::with_capacity(len as usize);
    let mut reader = BufReader::new(file);
    reader.read_to_end(&mut data).ok()?;
    if (data.len() as u64) < len {
        return None;
    }
    Some(data)
}
