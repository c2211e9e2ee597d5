//! Delete-or-trash.

use std::fmt;
use std::io;
use std::path::Path;
use tracing::{debug, error, info, warn};

use super::resolve::{absolute, canonicalize};
use super::walk::delete_tree;
use crate::errors::FsGuardError;

/// A platform's "move to trash" facility.
pub trait TrashBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Move `path` (already resolved) to the trash. `Ok(false)` means the facility ran
    /// but the item is still in place.
    fn move_to_trash(&self, path: &Path) -> io::Result<bool>;
}

/// Removes files and directories, either permanently or via a trash backend.
pub struct TrashDisposer {
    backend: Option<Box<dyn TrashBackend>>,
}

impl fmt::Debug for TrashDisposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrashDisposer")
            .field("backend", &self.backend.as_ref().map(|b| b.name()))
            .finish()
    }
}

impl TrashDisposer {
    pub fn new(backend: Option<Box<dyn TrashBackend>>) -> Self {
        Self { backend }
    }

    /// Use whatever trash facility this platform offers, if any.
    pub fn detect() -> Self {
        let backend = crate::platform::probe_trash_backend();
        debug!(backend = backend.as_ref().map(|b| b.name()).unwrap_or("none"), "trash backend probed");
        Self { backend }
    }

    pub fn supports_trash(&self) -> bool {
        self.backend.is_some()
    }

    /// Remove `path`.
    ///
    /// A missing path gives `Ok(false)`. With `use_trash` false the path is deleted
    /// recursively. With `use_trash` true it goes to the trash, or fails with
    /// [`FsGuardError::TrashUnsupported`] when there is none.
    pub fn dispose(&self, path: &Path, use_trash: bool) -> Result<bool, FsGuardError> {
        if std::fs::symlink_metadata(path).is_err() {
            debug!(path = %path.display(), "dispose: nothing there");
            return Ok(false);
        }
        if !use_trash {
            return Ok(delete_tree(path));
        }
        let backend = self.backend.as_ref().ok_or(FsGuardError::TrashUnsupported)?;

        let target = match canonicalize(path) {
            Ok(p) => p,
            Err(e) => {
                error!(path = %path.display(), error = %e, "dispose: cannot resolve; using absolute path");
                absolute(path)?
            }
        };
        match backend.move_to_trash(&target) {
            Ok(true) => {
                info!(path = %target.display(), backend = backend.name(), "moved to trash");
                Ok(true)
            }
            Ok(false) => {
                warn!(path = %target.display(), backend = backend.name(), "trash left the item in place");
                Ok(false)
            }
            Err(e) => {
                error!(path = %target.display(), backend = backend.name(), error = %e, "trash failed");
                Ok(false)
            }
        }
    }
}
