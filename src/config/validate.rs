//! Config validation.
//! Checks the log file location and that requested features exist on this platform.

use anyhow::{Result, bail};
use std::fs;
use tracing::debug;

use super::paths::path_has_symlink_ancestor;
use super::types::Config;

impl Config {
    /// Validate against this platform's capabilities.
    pub fn validate(&self) -> Result<()> {
        self.validate_for(crate::platform::probe_trash_backend().is_some())
    }

    /// Validate, given whether a trash facility is available.
    pub fn validate_for(&self, trash_available: bool) -> Result<()> {
        if self.use_trash && !trash_available {
            bail!("use_trash is set but this platform has no trash facility");
        }

        if let Some(log) = &self.log_file {
            if path_has_symlink_ancestor(log)? {
                bail!("log_file '{}' has a symlinked ancestor; refusing", log.display());
            }
            if let Ok(meta) = fs::symlink_metadata(log) {
                if meta.file_type().is_symlink() {
                    bail!("log_file '{}' is a symlink; refusing", log.display());
                }
                if meta.is_dir() {
                    bail!("log_file '{}' is a directory", log.display());
                }
            }
        }

        debug!(
            log_level = %self.log_level,
            log_file = %self.log_file.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<none>".into()),
            use_trash = self.use_trash,
            durability = %self.durability,
            "config validated"
        );
        Ok(())
    }
}
