// SPDX-License-Identifier: Apache-2.0 OR MIT
// Error types for the logging pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type for logging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the logging pipeline.
///
/// Consumer-side I/O failures (`FileWrite`) are handled on the consumer
/// thread: reported once to stderr, after which the file sink stays disabled
/// for the remainder of the process. They only appear here so the sink can
/// report what went wrong.
#[derive(Debug, Error)]
pub enum Error {
    #[error("logger not initialized")]
    NotInitialized,

    #[error("failed to open log file {path}: {source}")]
    FileOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write log file: {source}")]
    FileWrite { source: std::io::Error },

    #[error("failed to spawn log consumer thread: {source}")]
    ConsumerSpawn { source: std::io::Error },

    #[error("failed to read config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(String),
}
