//! Typed error definitions for fs_guard.
//! Only the failures that callers must act on are errors; verification mismatches,
//! exhausted moves and containment skips are reported as `false` by the operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsGuardError {
    #[error("Cannot resolve canonical path for {path}: {source}")]
    PathResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Moving to the trash is not supported on this platform")]
    TrashUnsupported,

    #[error("Unknown special folder tag: {0}")]
    UnknownSpecialFolder(String),

    #[error("Special folder '{0}' is not available on this system")]
    SpecialFolderUnavailable(String),

    #[error("Background job was cancelled before it started")]
    Cancelled,

    #[error("Background job was interrupted before it finished")]
    Interrupted,
}

impl FsGuardError {
    /// Stable numeric code used in structured logs and as the CLI exit status.
    pub fn code(&self) -> i32 {
        match self {
            FsGuardError::PathResolution { .. } => 10,
            FsGuardError::TrashUnsupported => 20,
            FsGuardError::UnknownSpecialFolder(_) => 30,
            FsGuardError::SpecialFolderUnavailable(_) => 31,
            FsGuardError::Cancelled => 40,
            FsGuardError::Interrupted => 41,
        }
    }

    /// Short machine-readable name for the `kind` log field.
    pub fn kind(&self) -> &'static str {
        match self {
            FsGuardError::PathResolution { .. } => "path_resolution",
            FsGuardError::TrashUnsupported => "trash_unsupported",
            FsGuardError::UnknownSpecialFolder(_) => "unknown_special_folder",
            FsGuardError::SpecialFolderUnavailable(_) => "special_folder_unavailable",
            FsGuardError::Cancelled => "cancelled",
            FsGuardError::Interrupted => "interrupted",
        }
    }

    pub(crate) fn resolution(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsGuardError::PathResolution {
            path: path.into(),
            source,
        }
    }
}
