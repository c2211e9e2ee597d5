//! Byte-for-byte file copy that reports how much it copied.
//!
//! Failures are not errors here: an I/O problem part-way through simply stops the copy
//! and the returned length comes up short. Callers compare the returned length against
//! what they asked for.
//!
//! Features:
//! - Destination is created or truncated (an existing file is overwritten).
//! - Linux: in-kernel `copy_file_range` when the filesystem supports it.
//! - Optional full fsync (`Durability::Full`); Windows opens with write-through.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

const BUF_SIZE: usize = 64 * 1024;

/// Durability mode controlling post-write flush behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Durability {
    /// Data reaches the OS page cache; no disk barrier.
    Data,
    /// Data and metadata forced to stable storage (`sync_all`).
    #[default]
    Full,
}

impl Durability {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "data" | "fast" => Some(Durability::Data),
            "full" | "sync" => Some(Durability::Full),
            _ => None,
        }
    }
}

impl fmt::Display for Durability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Durability::Data => "data",
            Durability::Full => "full",
        })
    }
}

impl FromStr for Durability {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid durability: '{s}'"))
    }
}

/// Copy the first `amount` bytes of `src` into `dst`, returning the number of bytes
/// actually copied. Returns `amount` only if the whole range made it.
pub fn copy_prefix(src: &Path, amount: u64, dst: &Path, mode: Durability) -> u64 {
    let mut src_f = match File::open(src) {
        Ok(f) => f,
        Err(e) => {
            debug!(src = %src.display(), error = %e, "copy: cannot open source");
            return 0;
        }
    };

    let mut opts = OpenOptions::new();
    opts.write(true).create(true).truncate(true);

    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        if matches!(mode, Durability::Full) {
            const FILE_FLAG_WRITE_THROUGH: u32 = 0x8000_0000;
            opts.custom_flags(FILE_FLAG_WRITE_THROUGH);
        }
    }

    let mut dst_f = match opts.open(dst) {
        Ok(f) => f,
        Err(e) => {
            debug!(dst = %dst.display(), error = %e, "copy: cannot open destination");
            return 0;
        }
    };

    let mut copied: u64 = 0;

    #[cfg(target_os = "linux")]
    {
        match kernel_copy(&src_f, &dst_f, amount) {
            KernelCopy::Done(n) => copied = n,
            KernelCopy::Unsupported => {}
        }
    }

    if copied < amount {
        copied += stream_copy(&mut src_f, &mut dst_f, amount - copied);
    }

    if matches!(mode, Durability::Full) {
        // Cleanup-class failure: never turns a full copy into a short one.
        if let Err(e) = dst_f.sync_all() {
            warn!(dst = %dst.display(), error = %e, "fsync after copy failed");
        }
    }

    copied
}

/// Copy all of `src` to `dst`. True iff the copied length equals the source length.
pub fn copy_file(src: &Path, dst: &Path, mode: Durability) -> bool {
    let len = match std::fs::metadata(src) {
        Ok(m) => m.len(),
        Err(e) => {
            debug!(src = %src.display(), error = %e, "copy: cannot stat source");
            return false;
        }
    };
    copy_prefix(src, len, dst, mode) == len
}

/// Buffered read/write loop; stops at EOF, `amount`, or the first I/O error.
fn stream_copy(src: &mut File, dst: &mut File, amount: u64) -> u64 {
    let mut buf = vec![0u8; BUF_SIZE];
    let mut remaining = amount;
    while remaining > 0 {
        let want = remaining.min(BUF_SIZE as u64) as usize;
        let read = match src.read(&mut buf[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!(error = %e, "copy: read failed");
                break;
            }
        };
        if let Err(e) = dst.write_all(&buf[..read]) {
            debug!(error = %e, "copy: write failed");
            break;
        }
        remaining -= read as u64;
    }
    amount - remaining
}

#[cfg(target_os = "linux")]
enum KernelCopy {
    Done(u64),
    Unsupported,
}

/// In-kernel copy via `copy_file_range`. Reports `Unsupported` only when nothing was
/// copied yet and the error says the filesystem pair cannot do it.
#[cfg(target_os = "linux")]
fn kernel_copy(src: &File, dst: &File, amount: u64) -> KernelCopy {
    use std::os::unix::io::AsRawFd;
    const CHUNK: u64 = 16 * 1024 * 1024;

    let mut total: u64 = 0;
    while total < amount {
        let want = (amount - total).min(CHUNK) as usize;
        let rc = unsafe {
            libc::copy_file_range(
                src.as_raw_fd(),
                std::ptr::null_mut(),
                dst.as_raw_fd(),
                std::ptr::null_mut(),
                want,
                0,
            )
        };
        if rc > 0 {
            total += rc as u64;
        } else if rc == 0 {
            break;
        } else {
            let err = io::Error::last_os_error();
            if total == 0
                && matches!(
                    err.raw_os_error(),
                    Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EPERM | libc::EOPNOTSUPP)
                )
            {
                return KernelCopy::Unsupported;
            }
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            debug!(error = %err, copied = total, "copy_file_range failed part-way");
            break;
        }
    }
    KernelCopy::Done(total)
}
