//! Canonical path resolution and containment checks.
//!
//! Every answer is recomputed from the filesystem on each call; nothing is cached
//! because the tree may change between two questions about it.
//!
//! Notes:
//! - Paths that do not exist yet are resolved through their deepest existing
//!   ancestor, with the missing tail applied lexically.
//! - On Windows, `ERROR_NO_MORE_FILES` during resolution is a known spurious failure;
//!   the absolute (non-canonical) path is used instead.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

use crate::errors::FsGuardError;

/// Resolve symlinks and relative segments to a unique absolute form.
pub fn canonicalize(path: &Path) -> Result<PathBuf, FsGuardError> {
    match dunce::canonicalize(path) {
        Ok(real) => Ok(real),
        Err(e) if is_spurious_no_more_files(&e) => {
            debug!(path = %path.display(), "canonicalize hit ERROR_NO_MORE_FILES; using absolute path");
            absolute(path)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let abs = absolute(path)?;
            canonicalize_missing(&abs).map_err(|e| FsGuardError::resolution(path, e))
        }
        Err(e) => Err(FsGuardError::resolution(path, e)),
    }
}

/// Absolute form without touching symlinks.
pub(crate) fn absolute(path: &Path) -> Result<PathBuf, FsGuardError> {
    std::path::absolute(path).map_err(|e| FsGuardError::resolution(path, e))
}

#[cfg(windows)]
fn is_spurious_no_more_files(e: &io::Error) -> bool {
    // ERROR_NO_MORE_FILES
    e.raw_os_error() == Some(18)
}

#[cfg(not(windows))]
fn is_spurious_no_more_files(_e: &io::Error) -> bool {
    false
}

/// Canonicalize the longest existing prefix of `abs`, then replay the rest lexically.
fn canonicalize_missing(abs: &Path) -> io::Result<PathBuf> {
    let comps: Vec<Component<'_>> = abs.components().collect();
    for split in (1..comps.len()).rev() {
        let prefix: PathBuf = comps[..split].iter().collect();
        match dunce::canonicalize(&prefix) {
            Ok(mut base) => {
                for c in &comps[split..] {
                    match c {
                        Component::CurDir => {}
                        Component::ParentDir => {
                            base.pop();
                        }
                        other => base.push(other.as_os_str()),
                    }
                }
                trace!(path = %abs.display(), resolved = %base.display(), "resolved through existing ancestor");
                return Ok(base);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no existing ancestor for '{}'", abs.display()),
    ))
}

/// True if `a` appears anywhere in `b`'s parent chain, `b` itself included.
/// Purely lexical: no filesystem access.
pub fn is_ancestor(a: &Path, b: &Path) -> bool {
    b.ancestors().any(|p| p == a)
}

/// The directory `child` lives in, as an absolute path.
/// A parentless (root) path stands in for its own parent.
fn parent_of(child: &Path) -> Result<PathBuf, FsGuardError> {
    let abs = absolute(child)?;
    Ok(abs.parent().map(Path::to_path_buf).unwrap_or(abs))
}

/// True iff `parent` resolves to the same place as `child`'s immediate parent directory.
pub fn is_immediate_parent(parent: &Path, child: &Path) -> Result<bool, FsGuardError> {
    let parent_real = canonicalize(parent)?;
    let child_parent_real = canonicalize(&parent_of(child)?)?;
    Ok(parent_real == child_parent_real)
}

/// True iff the canonical form of `child`'s parent starts with the canonical form of
/// `parent`, compared as strings.
///
/// Looser than [`is_immediate_parent`]: anything below `parent` passes, including paths
/// that climb out and re-enter the same subtree (`d/x/../x/f`). The comparison is a raw
/// string prefix, so a sibling sharing a name prefix (`/data/foo` vs `/data/foobar`)
/// also passes.
pub fn is_prefix_contained(parent: &Path, child: &Path) -> Result<bool, FsGuardError> {
    let parent_real = canonicalize(parent)?;
    let child_parent_real = canonicalize(&parent_of(child)?)?;
    Ok(starts_with_str(&child_parent_real, &parent_real))
}

/// String-prefix test on two resolved paths.
pub(crate) fn starts_with_str(path: &Path, prefix: &Path) -> bool {
    path.as_os_str()
        .to_string_lossy()
        .starts_with(prefix.as_os_str().to_string_lossy().as_ref())
}

/// Well-known per-user folders usable as `Tag>` prefixes in [`resolve_special_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialFolder {
    Home,
    Desktop,
    Documents,
    Downloads,
    Music,
    Pictures,
    Videos,
    AppData,
}

impl SpecialFolder {
    /// Case-insensitive tag lookup.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "home" => Some(SpecialFolder::Home),
            "desktop" => Some(SpecialFolder::Desktop),
            "documents" => Some(SpecialFolder::Documents),
            "downloads" => Some(SpecialFolder::Downloads),
            "music" => Some(SpecialFolder::Music),
            "pictures" => Some(SpecialFolder::Pictures),
            "videos" => Some(SpecialFolder::Videos),
            "appdata" => Some(SpecialFolder::AppData),
            _ => None,
        }
    }

    pub fn location(self) -> Option<PathBuf> {
        match self {
            SpecialFolder::Home => dirs::home_dir(),
            SpecialFolder::Desktop => dirs::desktop_dir(),
            SpecialFolder::Documents => dirs::document_dir(),
            SpecialFolder::Downloads => dirs::download_dir(),
            SpecialFolder::Music => dirs::audio_dir(),
            SpecialFolder::Pictures => dirs::picture_dir(),
            SpecialFolder::Videos => dirs::video_dir(),
            SpecialFolder::AppData => dirs::data_dir(),
        }
    }
}

/// Turn user-entered path text into an absolute path.
///
/// `Documents>Saved/Stuff` resolves under the user's documents folder; text without a
/// `>` is canonicalized relative to the working directory.
pub fn resolve_special_path(text: &str) -> Result<PathBuf, FsGuardError> {
    if let Some((tag, rest)) = text.split_once('>') {
        let folder = SpecialFolder::parse(tag)
            .ok_or_else(|| FsGuardError::UnknownSpecialFolder(tag.to_string()))?;
        let base = folder
            .location()
            .ok_or_else(|| FsGuardError::SpecialFolderUnavailable(tag.to_string()))?;
        let rest: OsString = rest.into();
        return absolute(&base.join(rest));
    }
    canonicalize(Path::new(text))
}
