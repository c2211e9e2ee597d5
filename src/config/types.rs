//! Core configuration types.
//! - Config holds runtime settings with defaults.
//! - LogLevel is the user-facing verbosity.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::fs_ops::Durability;

/// Program-defined verbosity levels exposed to users/config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Committed operations and warnings (default)
    #[default]
    Normal,
    /// Tier decisions and skipped items
    Info,
    /// Everything
    Debug,
}

impl LogLevel {
    /// Parse common names (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        })
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional log file (in addition to stderr)
    pub log_file: Option<PathBuf>,
    /// Send deletions to the platform trash instead of removing them
    pub use_trash: bool,
    /// Flush policy for saves and copies
    pub durability: Durability,
}
