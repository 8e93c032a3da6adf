// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log severity levels

use serde::{Deserialize, Serialize};

/// Log severity levels (higher is more severe; STEP is a presentation-only
/// level that ranks above FATAL so it is never filtered out)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Verbose execution traces
    Trace = 0,
    /// Diagnostic detail
    Debug = 1,
    /// Normal operation
    Info = 2,
    /// Something is off but the process continues
    Warning = 3,
    /// An operation failed
    Error = 4,
    /// The process cannot continue
    Fatal = 5,
    /// Milestone marker lines
    Step = 6,
}

impl Level {
    /// Get level as u8 (0-6)
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get the token used in formatted output. WARNING prints as "WARN".
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
            Level::Step => "STEP",
        }
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::Trace),
            1 => Some(Level::Debug),
            2 => Some(Level::Info),
            3 => Some(Level::Warning),
            4 => Some(Level::Error),
            5 => Some(Level::Fatal),
            6 => Some(Level::Step),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
