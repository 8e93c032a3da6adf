// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Logger configuration.
//!
//! JSON5 configuration format supporting comments and trailing commas, with
//! per-field defaults so partial files work.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::level::Level;

/// Logger configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Directory for log files
    pub log_dir: PathBuf,

    /// Log file name prefix; the active file is `<log_dir>/<file_prefix>.log`
    pub file_prefix: String,

    /// Rotation threshold for the active file, in bytes
    pub max_file_bytes: u64,

    /// Number of matching files kept by retention (active file included)
    pub max_files: usize,

    /// Records below this level are discarded at the submission site
    pub min_level: Level,

    /// Write formatted records to stdout
    pub console_output: bool,

    /// Write formatted records to the rotating file
    pub file_output: bool,

    /// Wrap console lines in ANSI color escapes (never applied to the file)
    pub use_colors: bool,

    /// Include the `[YYYY-MM-DD HH:MM:SS.mmm]` field
    pub show_timestamp: bool,

    /// Include the `[T-<id>]` producer field
    pub show_thread_id: bool,

    /// Include the `[file:line]` field
    pub show_source_location: bool,

    /// Include the `[module]` field (when the module name is non-empty)
    pub show_module_name: bool,

    /// Print the full source path instead of the basename
    pub show_full_path: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            file_prefix: "app".to_string(),
            max_file_bytes: 10 * 1024 * 1024,
            max_files: 5,
            min_level: Level::Info,
            console_output: true,
            file_output: true,
            use_colors: true,
            show_timestamp: true,
            show_thread_id: true,
            show_source_location: true,
            show_module_name: true,
            show_full_path: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string
    pub fn parse(content: &str) -> Result<Self> {
        json5::from_str(content).map_err(|e| Error::ConfigParse(e.to_string()))
    }

    /// Path of the active log file
    pub(crate) fn active_file(&self) -> PathBuf {
        self.log_dir.join(format!("{}.log", self.file_prefix))
    }

    /// True when `other` differs in a field that requires reopening the file
    /// sink (destination path, rotation parameters, or file output itself).
    pub(crate) fn sink_changed(&self, other: &Config) -> bool {
        self.file_output != other.file_output
            || self.log_dir != other.log_dir
            || self.file_prefix != other.file_prefix
            || self.max_file_bytes != other.max_file_bytes
            || self.max_files != other.max_files
    }
}
