//! Persistent user settings.

use crate::error::{io_context, Result};
use crate::export::ExportOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the data files read by import.
    pub data_directory: Option<PathBuf>,
    /// Where exports write when no output directory is given.
    pub output_directory: Option<PathBuf>,
    pub run_protoc: bool,
}

impl Config {
    /// Load settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %path.display(), "no config loaded: {e}");
                return Self::default();
            }
        };
        serde_json::from_str(&text).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "ignoring invalid config: {e}");
            Self::default()
        })
    }

    /// Save settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_context(parent, e))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).map_err(|e| io_context(path, e))?;
        Ok(())
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            run_protoc: self.run_protoc,
        }
    }
}
