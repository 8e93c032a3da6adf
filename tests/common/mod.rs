// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Shared helpers for the integration suites.
//!
//! Each scenario lives in its own test binary: the logger is a process-wide
//! singleton, so a second `initialize`/`destroy_instance` cycle inside one
//! test process is not possible.

use rapidlog::{Config, Level};
use std::fs;
use std::path::{Path, PathBuf};

/// Baseline config for file-only assertions: everything from TRACE up goes
/// to the file, nothing to the console, no colors.
pub fn file_only_config(dir: &Path, prefix: &str) -> Config {
    Config {
        log_dir: dir.to_path_buf(),
        file_prefix: prefix.to_string(),
        max_file_bytes: 1024 * 1024,
        max_files: 3,
        min_level: Level::Trace,
        console_output: false,
        file_output: true,
        use_colors: false,
        ..Config::default()
    }
}

/// All log files for `prefix` in `dir`, oldest first (active file last).
pub fn log_files(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut files: Vec<(std::time::SystemTime, PathBuf)> = fs::read_dir(dir)
        .expect("read log dir")
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|ext| ext == "log")
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .is_some_and(|stem| stem.starts_with(prefix))
        })
        .map(|path| {
            let mtime = fs::metadata(&path)
                .and_then(|m| m.modified())
                .expect("mtime");
            (mtime, path)
        })
        .collect();
    files.sort();
    files.into_iter().map(|(_, path)| path).collect()
}

/// Concatenated content of every matching log file, oldest first.
pub fn read_merged(dir: &Path, prefix: &str) -> String {
    let mut merged = String::new();
    for path in log_files(dir, prefix) {
        merged.push_str(&fs::read_to_string(path).expect("read log file"));
    }
    merged
}
