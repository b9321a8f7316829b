//! Standard streams, mostly for foreground runs and containers that collect stdout.

use super::Sink;
use crate::Error;
use crate::fmt::Pattern;
use crate::record::LogRecord;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug)]
pub struct ConsoleSink {
    name: String,
    stream: Stream,
    pattern: Pattern,
}

impl ConsoleSink {
    #[must_use]
    pub fn new(name: impl Into<String>, stream: Stream, pattern: Pattern) -> Self {
        Self {
            name: name.into(),
            stream,
            pattern,
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), Error> {
        let line = self.pattern.render(record);
        // The std handles carry their own lock, one writeln keeps the line whole
        match self.stream {
            Stream::Stdout => writeln!(io::stdout().lock(), "{line}")?,
            Stream::Stderr => writeln!(io::stderr().lock(), "{line}")?,
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        match self.stream {
            Stream::Stdout => io::stdout().flush()?,
            Stream::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }
}
