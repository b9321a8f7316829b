//! In-memory sink for tests and for embedding the facility in tools that want
//! the rendered lines instead of files.

use super::{Sink, lock};
use crate::Error;
use crate::fmt::Pattern;
use crate::record::LogRecord;
use std::sync::Mutex;

/// Keeps every rendered line in order of arrival.
#[derive(Debug)]
pub struct MemorySink {
    name: String,
    pattern: Pattern,
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Renders only the message body, which keeps assertions independent of the clock.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_pattern(name, Pattern::parse("{msg}"))
    }

    #[must_use]
    pub fn with_pattern(name: impl Into<String>, pattern: Pattern) -> Self {
        Self {
            name: name.into(),
            pattern,
            lines: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of everything written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.lock().map(|l| l.len()).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), Error> {
        let line = self.pattern.render(record);
        lock(&self.lines, &self.name)?.push(line);
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}
