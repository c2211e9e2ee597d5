//! macOS trash via Finder automation (`osascript`).

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::fs_ops::trash::TrashBackend;

const OSASCRIPT: &str = "/usr/bin/osascript";

#[derive(Debug)]
pub struct FinderTrash;

impl FinderTrash {
    pub fn probe() -> Option<Self> {
        Path::new(OSASCRIPT).exists().then_some(FinderTrash)
    }
}

/// Quote `s` as an AppleScript string literal.
fn applescript_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn trash_script(path: &Path) -> Vec<String> {
    let kind = if path.is_file() { "file" } else { "folder" };
    vec![
        format!("set unixPath to {}", applescript_quote(&path.to_string_lossy())),
        "set hfsPath to POSIX file unixPath".to_string(),
        "tell application \"Finder\"".to_string(),
        format!("if {kind} hfsPath exists then"),
        format!("move {kind} hfsPath to trash"),
        "end if".to_string(),
        "end tell".to_string(),
    ]
}

impl TrashBackend for FinderTrash {
    fn name(&self) -> &'static str {
        "finder"
    }

    fn move_to_trash(&self, path: &Path) -> io::Result<bool> {
        let mut cmd = Command::new(OSASCRIPT);
        for line in trash_script(path) {
            cmd.arg("-e").arg(line);
        }
        let out = cmd.stdin(Stdio::null()).output()?;
        if !out.status.success() {
            debug!(
                status = ?out.status,
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "osascript reported failure"
            );
        }
        // Finder's own exit status is unreliable; the item being gone is the answer.
        Ok(!path.exists())
    }
}
