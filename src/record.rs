//! The unit of work flowing from a producer through a pipeline into sinks.

use crate::level::Level;
use chrono::{DateTime, Local};
use std::sync::Arc;

/// Where an error-channel record was emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
    /// Rust has no `function!()`; the macros fill this with `module_path!()`.
    pub function: &'static str,
}

impl SourceLocation {
    #[must_use]
    pub const fn new(file: &'static str, line: u32, function: &'static str) -> Self {
        Self {
            file,
            line,
            function,
        }
    }
}

/// Immutable once built. Timestamped when the channel accepts it, not when a worker writes it.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    /// Shared with the owning channel so building a record never copies the name.
    pub channel: Arc<str>,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl LogRecord {
    #[must_use]
    pub fn new(
        level: Level,
        channel: Arc<str>,
        message: String,
        location: Option<SourceLocation>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            level,
            channel,
            message,
            location,
        }
    }
}
