//! XML configuration file.
//!
//! Notes:
//! - Unknown elements are rejected so a typo cannot silently fall back to a default.
//! - Empty elements are treated as absent.
//! - Only reads and writes the file; checks on the values live in `validate`.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use crate::fs_ops::Durability;
use crate::platform::write_config_secure_0600;

/// Mirror of the XML document.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    log_level: Option<String>,
    log_file: Option<String>,
    use_trash: Option<String>,
    durability: Option<String>,
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bool(field: &str, s: &str) -> Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => bail!("invalid <{field}> value '{s}' (expected true or false)"),
    }
}

fn xml_to_config(parsed: &XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();
    if let Some(s) = non_empty(&parsed.log_level) {
        cfg.log_level = s.parse::<LogLevel>().map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = non_empty(&parsed.log_file) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    if let Some(s) = non_empty(&parsed.use_trash) {
        cfg.use_trash = parse_bool("use_trash", s)?;
    }
    if let Some(s) = non_empty(&parsed.durability) {
        cfg.durability = s.parse::<Durability>().map_err(anyhow::Error::msg)?;
    }
    Ok(cfg)
}

/// Parse config XML text.
pub fn parse_config_xml(contents: &str) -> Result<Config> {
    if contents.trim().is_empty() {
        return Ok(Config::default());
    }
    let parsed: XmlConfig = from_xml_str(contents)?;
    xml_to_config(&parsed)
}

/// Load a Config from a specific XML file.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config xml '{}'", path.display()))?;
    parse_config_xml(&contents).with_context(|| format!("parse config xml '{}'", path.display()))
}

/// Which file (if any) a Config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
}

/// Load the effective file config.
///
/// An `explicit` path must exist. Otherwise the default location is used, and a missing
/// file there simply means defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(p) = explicit {
        if !p.exists() {
            bail!("config file '{}' does not exist", p.display());
        }
        return Ok(LoadedConfig {
            config: load_config_from_xml_path(p)?,
            source: Some(p.to_path_buf()),
        });
    }
    match default_config_path() {
        Some(p) if p.is_file() => Ok(LoadedConfig {
            config: load_config_from_xml_path(&p)?,
            source: Some(p),
        }),
        _ => Ok(LoadedConfig {
            config: Config::default(),
            source: None,
        }),
    }
}

fn template_text() -> String {
    let suggested_log = default_log_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "/path/to/fs_guard.log".into());
    format!(
        "<!--\n  fs_guard configuration (XML)\n\n    log_level   -> quiet | normal | info | debug\n    log_file    -> optional log file; stderr is always used\n    use_trash   -> true to send deletions to the platform trash\n    durability  -> full (fsync) | data (flush only)\n\n  CLI flags override values here.\n-->\n<config>\n  <log_level>{}</log_level>\n  <log_file>{}</log_file>\n  <use_trash>false</use_trash>\n  <durability>{}</durability>\n</config>\n",
        LogLevel::default(),
        suggested_log,
        Durability::default(),
    )
}

/// Write a commented template config to `path` (0600 on Unix). Refuses to overwrite an
/// existing file or to write below a symlinked directory.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("config file '{}' already exists", path.display());
    }
    if path_has_symlink_ancestor(path)? {
        bail!("refusing to create config: an ancestor of '{}' is a symlink", path.display());
    }
    write_config_secure_0600(path, template_text().as_bytes())?;
    info!(path = %path.display(), "created template config");
    Ok(())
}
