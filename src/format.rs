// SPDX-License-Identifier: Apache-2.0 OR MIT
// Pure record-to-bytes formatting

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Local};

use crate::config::Config;
use crate::level::Level;
use crate::record::Record;

const RESET: &str = "\x1b[0m";

/// ANSI SGR foreground color for a level's console line
const fn level_color(level: Level) -> &'static str {
    match level {
        Level::Trace => "\x1b[36m",   // cyan
        Level::Debug => "\x1b[35m",   // magenta
        Level::Info => "\x1b[32m",    // green
        Level::Warning => "\x1b[33m", // yellow
        Level::Error => "\x1b[31m",   // red
        Level::Fatal => "\x1b[1;31m", // bright red
        Level::Step => "\x1b[34m",    // blue
    }
}

/// Display options for one render call, copied out of the live config so the
/// formatter itself stays free of shared state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormatOptions {
    pub show_timestamp: bool,
    pub show_thread_id: bool,
    pub show_module_name: bool,
    pub show_source_location: bool,
    pub show_full_path: bool,
    /// Wrap the line in color escapes (console only, never the file)
    pub color: bool,
}

impl FormatOptions {
    pub(crate) fn from_config(config: &Config, color: bool) -> Self {
        Self {
            show_timestamp: config.show_timestamp,
            show_thread_id: config.show_thread_id,
            show_module_name: config.show_module_name,
            show_source_location: config.show_source_location,
            show_full_path: config.show_full_path,
            color,
        }
    }
}

/// Append one formatted record to `out`, terminated with `\n`.
///
/// Field layout: `[timestamp] [LEVEL] [T-<id>] [module] [file:line] message`.
/// With `color` set, the level escape precedes the line and the reset escape
/// closes it, both before the trailing newline.
pub(crate) fn render(record: &Record, opts: &FormatOptions, out: &mut Vec<u8>) {
    if opts.color {
        out.extend_from_slice(level_color(record.level).as_bytes());
    }

    if opts.show_timestamp {
        let ts: DateTime<Local> = record.timestamp.into();
        let _ = write!(out, "[{}] ", ts.format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    let _ = write!(out, "[{}] ", record.level.as_str());

    if opts.show_thread_id {
        let _ = write!(out, "[T-{}] ", record.context.thread_id);
    }

    if opts.show_module_name && !record.context.module.is_empty() {
        let _ = write!(out, "[{}] ", record.context.module);
    }

    if opts.show_source_location {
        let file = if opts.show_full_path {
            record.context.file
        } else {
            Path::new(record.context.file)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(record.context.file)
        };
        let _ = write!(out, "[{}:{}] ", file, record.context.line);
    }

    out.extend_from_slice(record.message.as_bytes());

    if opts.color {
        out.extend_from_slice(RESET.as_bytes());
    }
    out.push(b'\n');
}
