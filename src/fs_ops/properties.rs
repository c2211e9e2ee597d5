//! `key=value` settings files, saved through [`AtomicWriter`].
//!
//! Format, one entry per line:
//! - `key=value` or `key:value`; whitespace around the separator is ignored;
//! - lines starting with `#` or `!` are comments;
//! - backslash escapes: `\\`, `\n`, `\t`, `\r`, `\=`, `\:`; any other escaped
//!   character stands for itself.

use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::atomic::AtomicWriter;
use super::helpers::io_error_with_help;

const HEADER: &str = "# fs_guard settings";

/// A settings file on disk.
#[derive(Debug, Clone)]
pub struct SettingsFile {
    path: PathBuf,
    writer: AtomicWriter,
}

impl SettingsFile {
    pub fn new(path: impl Into<PathBuf>, writer: AtomicWriter) -> Self {
        Self {
            path: path.into(),
            writer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry. A file that does not exist yet reads as empty.
    pub fn load(&self) -> Result<BTreeMap<String, String>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file absent; starting empty");
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(io_error_with_help("read settings", &self.path)(e)),
        };
        Ok(parse(&text))
    }

    /// Replace the file with `entries`, verified on disk before it becomes visible.
    pub fn store(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("settings path '{}' has no usable file name", self.path.display()))?;

        let text = render(entries);
        if !self.writer.save_verified(dir, name, text.as_bytes()) {
            bail!("could not save settings to '{}'", self.path.display());
        }
        Ok(())
    }
}

/// Parse settings text into a map; later duplicates win.
pub fn parse(text: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for raw in text.lines() {
        let line = raw.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        let (key, value) = split_entry(line);
        out.insert(unescape(trim_end_unescaped(key)), unescape(value.trim_start()));
    }
    out
}

/// Split at the first unescaped `=` or `:`. No separator means an empty value.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' {
            return (&line[..i], &line[i + 1..]);
        }
    }
    (line, "")
}

/// Trim trailing whitespace, stopping at whitespace escaped by an odd run of backslashes.
fn trim_end_unescaped(s: &str) -> &str {
    let mut end = s.len();
    while let Some(c) = s[..end].chars().next_back() {
        if !c.is_whitespace() {
            break;
        }
        let start = end - c.len_utf8();
        let slashes = s[..start].chars().rev().take_while(|&b| b == '\\').count();
        if slashes % 2 == 1 {
            break;
        }
        end = start;
    }
    &s[..end]
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape(s: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, c) in s.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(c);
            }
            // Would otherwise be read as a comment or trimmed away.
            '#' | '!' | ' ' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            ' ' if is_key => out.push_str("\\ "),
            _ => out.push(c),
        }
    }
    out
}

/// Render `entries` sorted by key, after a comment header.
pub fn render(entries: &BTreeMap<String, String>) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for (k, v) in entries {
        out.push_str(&escape(k, true));
        out.push('=');
        out.push_str(&escape(v, false));
        out.push('\n');
    }
    out
}
