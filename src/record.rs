// SPDX-License-Identifier: Apache-2.0 OR MIT
// In-memory log record and its call-site context

use std::time::SystemTime;

use crate::level::Level;

/// Longest accepted message payload. Longer messages are cut at a char
/// boundary and suffixed with [`TRUNCATION_MARKER`].
pub(crate) const MAX_MESSAGE_BYTES: usize = 64 * 1024;

pub(crate) const TRUNCATION_MARKER: &str = " [truncated]";

/// Call-site location, captured by the logging macros (or supplied directly
/// by a caller of [`Logger::log`](crate::Logger::log)).
#[derive(Debug, Clone, Copy)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    pub function: &'static str,
}

/// Context attached to every record: what produced it and from where.
#[derive(Debug)]
pub struct Context {
    /// Per-producer module name, empty until `set_module_name` is called
    pub module: String,
    pub function: &'static str,
    pub file: &'static str,
    pub line: u32,
    /// Stable identifier of the producing thread
    pub thread_id: u32,
}

/// One log record. Move-only: once enqueued the producer loses ownership,
/// and the consumer reads it by reference while formatting. Cache-line
/// aligned so ring slots never straddle a line.
#[derive(Debug)]
#[repr(align(64))]
pub struct Record {
    pub message: String,
    pub level: Level,
    pub context: Context,
    pub timestamp: SystemTime,
}

impl Record {
    /// Build a record, stamping the wall-clock timestamp on the calling
    /// (producer) thread so per-producer timestamps are monotonic under a
    /// well-behaved clock.
    pub fn new(message: String, level: Level, context: Context) -> Self {
        Self {
            message,
            level,
            context,
            timestamp: SystemTime::now(),
        }
    }
}

/// Cap a message at [`MAX_MESSAGE_BYTES`], cutting on a char boundary and
/// appending the truncation marker.
pub(crate) fn enforce_message_cap(message: &mut String) {
    if message.len() <= MAX_MESSAGE_BYTES {
        return;
    }
    let mut cut = MAX_MESSAGE_BYTES - TRUNCATION_MARKER.len();
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    message.truncate(cut);
    message.push_str(TRUNCATION_MARKER);
}

/// Stable unsigned identifier for the current thread.
pub(crate) fn current_thread_id() -> u32 {
    #[cfg(target_os = "linux")]
    {
        // SAFETY: gettid has no preconditions and always succeeds
        unsafe { libc::gettid() as u32 }
    }
    #[cfg(not(target_os = "linux"))]
    {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        std::thread::current().id().hash(&mut hasher);
        hasher.finish() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> Context {
        Context {
            module: "Test".to_string(),
            function: "tests",
            file: "record.rs",
            line: 1,
            thread_id: current_thread_id(),
        }
    }

    #[test]
    fn test_record_creation() {
        let before = SystemTime::now();
        let record = Record::new("hello".to_string(), Level::Info, context());
        assert_eq!(record.message, "hello");
        assert_eq!(record.level, Level::Info);
        assert!(record.timestamp >= before);
    }

    #[test]
    fn test_short_message_untouched() {
        let mut msg = "short".to_string();
        enforce_message_cap(&mut msg);
        assert_eq!(msg, "short");
    }

    #[test]
    fn test_message_truncation() {
        let mut msg = "a".repeat(MAX_MESSAGE_BYTES + 1);
        enforce_message_cap(&mut msg);
        assert_eq!(msg.len(), MAX_MESSAGE_BYTES);
        assert!(msg.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_truncation_respects_char_boundary() {
        let cut = MAX_MESSAGE_BYTES - TRUNCATION_MARKER.len();
        // place a multi-byte char straddling the cut point
        let mut msg = "a".repeat(cut - 1);
        msg.push('é');
        msg.push_str(&"b".repeat(MAX_MESSAGE_BYTES));
        enforce_message_cap(&mut msg);
        assert!(msg.ends_with(TRUNCATION_MARKER));
        assert!(msg.is_char_boundary(msg.len() - TRUNCATION_MARKER.len()));
    }

    #[test]
    fn test_thread_id_stable() {
        assert_eq!(current_thread_id(), current_thread_id());
    }

    #[test]
    fn test_thread_id_distinct_across_threads() {
        let here = current_thread_id();
        let there = std::thread::spawn(current_thread_id).join().unwrap();
        assert_ne!(here, there);
    }
}
