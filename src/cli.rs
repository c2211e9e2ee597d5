//! CLI definition and parsing.
//!
//! Notes:
//! - CLI flags override XML config values, which override defaults.
//! - `-d/--debug` is shorthand for `--log-level debug`.

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use fs_guard::{Config, LogLevel};

/// Defensive file operations: verified saves, forced moves, contained deletes.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Defensive file operations (verified saves, forced moves, contained deletes)")]
pub struct Args {
    /// Config file to use instead of $FS_GUARD_CONFIG / the per-user default.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Set log level: quiet, normal, info, debug.
    #[arg(long, global = true, value_name = "LEVEL", conflicts_with = "debug")]
    pub log_level: Option<LogLevel>,

    /// Enable debug logging (shorthand for --log-level debug).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Also write logs to this file.
    #[arg(long, global = true, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub json: bool,

    /// Print the config file location and effective settings, then exit.
    #[arg(long)]
    pub print_config: bool,

    /// Write a commented template config to the config location, then exit.
    #[arg(long)]
    pub init_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Move a file, asking lock holders to let go and falling back to copy + delete.
    Move {
        #[arg(value_hint = ValueHint::FilePath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        dst: PathBuf,
    },
    /// Save data into DIR/NAME only after verifying it on disk.
    Save {
        #[arg(value_hint = ValueHint::DirPath)]
        dir: PathBuf,
        name: String,
        /// Read the payload from FILE instead of stdin.
        #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
        input: Option<PathBuf>,
    },
    /// Copy a directory tree to a new location.
    CopyTree {
        #[arg(value_hint = ValueHint::DirPath)]
        src: PathBuf,
        #[arg(value_hint = ValueHint::DirPath)]
        dst: PathBuf,
    },
    /// Delete a file or directory tree, or move it to the trash.
    Delete {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
        /// Send to the platform trash.
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_trash")]
        trash: bool,
        /// Delete permanently even if the config enables the trash.
        #[arg(long, action = ArgAction::SetTrue)]
        no_trash: bool,
    },
    /// Print the total size in bytes of a file or directory tree.
    Size {
        #[arg(value_hint = ValueHint::AnyPath)]
        path: PathBuf,
    },
    /// List files under a directory, breadth-first.
    List {
        #[arg(value_hint = ValueHint::DirPath)]
        root: PathBuf,
        /// Only files with these extensions (comma separated, case-insensitive).
        #[arg(long, value_delimiter = ',', value_name = "EXT")]
        ext: Vec<String>,
    },
    /// Exit 0 if A and B overlap (same path or shared files), 1 otherwise.
    Conflicts {
        #[arg(value_hint = ValueHint::AnyPath)]
        a: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        b: PathBuf,
    },
    /// Report how CHILD relates to PARENT after resolving symlinks.
    Check {
        #[arg(value_hint = ValueHint::DirPath)]
        parent: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        child: PathBuf,
    },
}

impl Args {
    /// Effective log level from flags. `--debug` and `--log-level` are exclusive.
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level
    }

    /// Apply CLI overrides to a loaded Config. Unset flags leave it alone.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(f) = &self.log_file {
            cfg.log_file = Some(f.clone());
        }
    }
}

/// Whether a `delete` should use the trash: `--trash`/`--no-trash` win over the config.
pub fn wants_trash(trash: bool, no_trash: bool, cfg: &Config) -> bool {
    if trash {
        true
    } else if no_trash {
        false
    } else {
        cfg.use_trash
    }
}

pub fn parse() -> Args {
    Args::parse()
}
