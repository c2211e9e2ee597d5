//! Platform-specific helpers.
//! Hides OS differences (Unix/macOS/Windows) behind one set of functions.

#[cfg(target_os = "macos")]
mod macos;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

#[cfg(unix)]
pub use unix::{open_log_file_secure_append, write_config_secure_0600};

#[cfg(windows)]
pub use windows::{open_log_file_secure_append, write_config_secure_0600};

use crate::fs_ops::trash::TrashBackend;

/// The trash facility available on this platform, if any.
pub fn probe_trash_backend() -> Option<Box<dyn TrashBackend>> {
    #[cfg(target_os = "macos")]
    {
        macos::FinderTrash::probe().map(|b| Box::new(b) as Box<dyn TrashBackend>)
    }
    #[cfg(windows)]
    {
        Some(Box::new(windows::RecycleBin))
    }
    #[cfg(not(any(target_os = "macos", windows)))]
    {
        None
    }
}
