// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log levels and the compile-time minimum-level gate

use serde::{Deserialize, Serialize};

/// Log level (0-3, higher is more severe)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// Verbose diagnostics
    Debug = 0,
    /// Normal operation
    Info = 1,
    /// Something looks off but the program continues
    Warning = 2,
    /// Operation failed
    Error = 3,
}

impl Level {
    /// Get level as u8 (0-3)
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get level name as static string
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }

    /// The prefix baked into every registered format literal for this
    /// level. It travels with the literal, never with the record.
    pub const fn prefix(self) -> &'static str {
        match self {
            Level::Debug => "[DEBUG] ",
            Level::Info => "[INFO] ",
            Level::Warning => "[WARNING] ",
            Level::Error => "[ERROR] ",
        }
    }

    /// Create from u8 value (returns None if invalid)
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Level::Debug),
            1 => Some(Level::Info),
            2 => Some(Level::Warning),
            3 => Some(Level::Error),
            _ => None,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compile-time minimum level, selected by the `min-level-*` cargo
/// features. Call sites below it expand to nothing.
pub const MIN_LEVEL: Level = if cfg!(feature = "min-level-error") {
    Level::Error
} else if cfg!(feature = "min-level-warning") {
    Level::Warning
} else if cfg!(feature = "min-level-info") {
    Level::Info
} else {
    Level::Debug
};
