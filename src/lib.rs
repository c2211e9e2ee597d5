//! Core library for `fs_guard`.
//!
//! Defensive filesystem primitives for applications that keep settings and state on
//! disk next to other programs that may hold files open:
//!
//! - canonical path resolution and containment checks ([`fs_ops::resolve`]);
//! - verified saves that never leave a half-written destination ([`AtomicWriter`]);
//! - moves that ask registered lock holders to let go before falling back to a copy
//!   ([`ForcedMover`], [`LockerRegistry`]);
//! - tree walks whose deletions cannot escape the root through symlinks
//!   ([`fs_ops::walk`]);
//! - trash-or-delete disposal ([`TrashDisposer`]);
//! - background jobs reporting success, failure, cancellation or interruption.
//!
//! Most operations report plain `bool`/`u64` outcomes; typed failures use
//! [`FsGuardError`].

pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;

pub use config::{
    CONFIG_ENV, Config, LogLevel, default_config_path, default_log_path,
    path_has_symlink_ancestor,
};
pub use errors::FsGuardError;
pub use fs_ops::{
    AtomicWriter, Durability, FileLocker, ForcedMover, JobHandle, JobListener, JobOutcome,
    LockerRegistry, SettingsFile, TrashBackend, TrashDisposer,
};
