//! I/O error context.
//!
//! Adapters that turn a bare `io::Error` into a message naming the operation, the
//! path, and (where the OS code is recognizable) a short hint. Usable with `map_err`
//! from both `anyhow::Result` and `io::Result` code:
//!
//!   fs::create_dir(dst).map_err(io_error_with_help("create directory", dst))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

#[cfg(unix)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        libc::EACCES | libc::EPERM => "permission denied; check ownership and write bits",
        libc::EXDEV => "different filesystem; rename cannot cross devices",
        libc::EBUSY | libc::ETXTBSY => "busy; another process is using it",
        libc::ENOENT => "does not exist (anymore)",
        libc::EEXIST => "already exists",
        libc::ENOTEMPTY => "directory not empty; something was left inside",
        libc::ENOTDIR => "a path component is not a directory",
        libc::EISDIR => "is a directory",
        libc::ENOSPC => "no space left on device",
        libc::EROFS => "read-only filesystem",
        libc::ELOOP => "too many symbolic link levels; possible symlink cycle",
        libc::ENAMETOOLONG => "name too long",
        libc::EMFILE | libc::ENFILE => "too many open files",
        _ => return None,
    };
    Some(hint)
}

#[cfg(windows)]
fn os_hint(code: i32) -> Option<&'static str> {
    let hint = match code {
        5 => "access denied",
        17 => "different drive; rename cannot cross devices",
        32 | 33 => "in use by another process",
        2 | 3 => "does not exist (anymore)",
        80 | 183 => "already exists",
        145 => "directory not empty",
        112 => "disk full",
        19 => "write protected",
        206 => "path too long",
        _ => return None,
    };
    Some(hint)
}

#[cfg(not(any(unix, windows)))]
fn os_hint(_code: i32) -> Option<&'static str> {
    None
}

fn kind_hint(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => Some("permission denied"),
        io::ErrorKind::NotFound => Some("does not exist (anymore)"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Some("busy; retry later"),
        _ => None,
    }
}

fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);
    let hint = match e.raw_os_error() {
        Some(code) => os_hint(code),
        None => kind_hint(e.kind()),
    };
    if let Some(h) = hint {
        msg.push_str(" (");
        msg.push_str(h);
        msg.push(')');
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// `io::Error -> anyhow::Error` with operation/path context.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

/// `io::Error -> io::Error` with operation/path context; the `ErrorKind` is preserved.
pub fn io_error_with_help_io<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> io::Error + 'a {
    move |e: io::Error| io::Error::new(e.kind(), build_message(op, path, &e))
}
