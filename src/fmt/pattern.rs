//! Each sink lays its records out differently: the combined file wants the channel
//! name, the error file wants the source location. A `Pattern` is parsed once per
//! sink and rendered for every record the sink receives.

use crate::record::LogRecord;
use std::fmt::Write as _;

/// Default layout for timestamps: local time with millisecond precision.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Closed set of known substitution tokens. Unknown `{names}` pass through as literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Timestamp,
    Level,
    Channel,
    Msg,
    File,
    Line,
    Func,
}

impl Placeholder {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Level => "level",
            Self::Channel => "channel",
            Self::Msg => "msg",
            Self::File => "file",
            Self::Line => "line",
            Self::Func => "func",
        }
    }

    pub const ALL: &'static [Self] = &[
        Self::Timestamp,
        Self::Level,
        Self::Channel,
        Self::Msg,
        Self::File,
        Self::Line,
        Self::Func,
    ];

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ph| ph.as_str() == name)
    }
}

/// Parsing into segments once avoids re-scanning the pattern on every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Pre-parsed record layout, e.g. `[{timestamp}] [{level}] [{channel}] {msg}`.
#[derive(Debug, Clone)]
pub struct Pattern {
    segments: Vec<Segment>,
    timestamp_format: String,
}

impl Pattern {
    /// Parses a pattern using the default timestamp format.
    #[must_use]
    pub fn parse(pattern: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                // Unterminated brace: everything left is literal
                literal.push_str(&rest[open..]);
                rest = "";
                break;
            };

            let name = &after[..close];
            if let Some(ph) = Placeholder::from_name(name) {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Placeholder(ph));
            } else {
                literal.push('{');
                literal.push_str(name);
                literal.push('}');
            }
            rest = &after[close + 1..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            segments,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    /// strftime-style format used for `{timestamp}`.
    #[must_use]
    pub fn timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Renders one record into a single line, without the trailing newline.
    #[must_use]
    pub fn render(&self, record: &LogRecord) -> String {
        let mut out = String::with_capacity(record.message.len() + 64);

        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Placeholder(ph) => match ph {
                    Placeholder::Timestamp => {
                        let _ = write!(out, "{}", record.timestamp.format(&self.timestamp_format));
                    }
                    Placeholder::Level => out.push_str(record.level.as_str()),
                    Placeholder::Channel => out.push_str(&record.channel),
                    Placeholder::Msg => out.push_str(&record.message),
                    Placeholder::File => {
                        if let Some(loc) = &record.location {
                            out.push_str(loc.file);
                        }
                    }
                    Placeholder::Line => {
                        if let Some(loc) = &record.location {
                            let _ = write!(out, "{}", loc.line);
                        }
                    }
                    Placeholder::Func => {
                        if let Some(loc) = &record.location {
                            out.push_str(loc.function);
                        }
                    }
                },
            }
        }

        out
    }
}

impl Default for Pattern {
    fn default() -> Self {
        Self::parse("[{timestamp}] [{level}] {msg}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::record::SourceLocation;

    #[test]
    fn unknown_placeholder_stays_literal() {
        let pattern = Pattern::parse("{nope} {msg}");
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Literal("{nope} ".to_string()),
                Segment::Placeholder(Placeholder::Msg),
            ]
        );
    }

    #[test]
    fn unterminated_brace_is_literal() {
        let pattern = Pattern::parse("{msg} {oops");
        let record = LogRecord::new(Level::Info, "c".into(), "hi".to_string(), None);
        assert_eq!(pattern.render(&record), "hi {oops");
    }

    #[test]
    fn renders_location_fields() {
        let pattern = Pattern::parse("[{level}] [{file}:{line} {func}] {msg}");
        let loc = SourceLocation::new("src/main.rs", 42, "server::boot");
        let record = LogRecord::new(Level::Error, "syserr".into(), "boom".to_string(), Some(loc));
        assert_eq!(pattern.render(&record), "[error] [src/main.rs:42 server::boot] boom");
    }

    #[test]
    fn missing_location_renders_empty() {
        let pattern = Pattern::parse("[{file}:{line}] {msg}");
        let record = LogRecord::new(Level::Info, "c".into(), "x".to_string(), None);
        assert_eq!(pattern.render(&record), "[:] x");
    }
}
