//! Filesystem operations.
//!
//! - `resolve`: canonical paths and containment checks
//! - `lockers`: registry of parties that can release file handles
//! - `force_move`: rename with lock-release retry and copy fallback
//! - `atomic`: write, verify, then move into place
//! - `walk`: whole-tree listing, copy, delete, size, overlap
//! - `trash`: delete or send to the platform trash
//! - `jobs`: background runs of the above with a four-way listener
//! - `properties`: `key=value` settings files

pub mod atomic;
pub mod force_move;
pub mod fsutil;
pub mod helpers;
pub mod io_copy;
pub mod jobs;
pub mod lockers;
pub mod properties;
pub mod resolve;
pub mod trash;
mod util;
pub mod walk;

pub use atomic::{AtomicWriter, read_file_fully};
pub use force_move::ForcedMover;
pub use fsutil::{file_extension, make_folder, set_writable, touch};
pub use helpers::{io_error_with_help, io_error_with_help_io};
pub use io_copy::{Durability, copy_file, copy_prefix};
pub use jobs::{
    JobHandle, JobListener, JobOutcome, spawn_copy_tree, spawn_delete_tree, spawn_job,
    spawn_total_size,
};
pub use lockers::{FileLocker, LockerRegistry};
pub use properties::SettingsFile;
pub use resolve::{
    SpecialFolder, canonicalize, is_ancestor, is_immediate_parent, is_prefix_contained,
    resolve_special_path,
};
pub use trash::{TrashBackend, TrashDisposer};
pub use walk::{conflicts, copy_tree, copy_tree_with, delete_tree, enumerate, total_size};
