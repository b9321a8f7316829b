//! Unified error type for all chanlog operations.

use std::path::PathBuf;

/// Error type for chanlog operations.
///
/// Nothing in here ever reaches a producer calling `emit`: delivery failures are
/// counted by the pipeline. These errors surface from configuration, sink setup
/// and explicit calls such as [`Sink::write`](crate::sink::Sink::write).
#[derive(Debug)]
pub enum Error {
    /// I/O error.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Config directory not found.
    ConfigDirNotFound,
    /// Cyclic include detected in config sources.
    CyclicInclude(PathBuf),
    /// Invalid log level string.
    InvalidLevel(String),
    /// Size string such as `16M` could not be parsed.
    InvalidSize(String),
    /// A channel references a sink that was never declared.
    UnknownSink { channel: String, sink: String },
    /// A channel must be bound to at least one sink.
    EmptyChannel(String),
    /// Channel names are unique across the facility.
    DuplicateChannel(String),
    /// Structurally valid config with values that cannot work (zero capacity, etc.).
    InvalidConfig(String),
    /// A sink's internal lock was poisoned by a panicking writer.
    Poisoned(String),
    /// The process-wide facility can only be installed once.
    AlreadyInstalled,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::ConfigDirNotFound => write!(f, "config directory not found"),
            Self::CyclicInclude(p) => write!(f, "cyclic include: {}", p.display()),
            Self::InvalidLevel(level) => write!(f, "invalid log level: {level}"),
            Self::InvalidSize(size) => write!(f, "invalid size: {size}"),
            Self::UnknownSink { channel, sink } => {
                write!(f, "channel '{channel}' references unknown sink '{sink}'")
            }
            Self::EmptyChannel(name) => write!(f, "channel '{name}' has no sinks"),
            Self::DuplicateChannel(name) => write!(f, "duplicate channel: {name}"),
            Self::InvalidConfig(s) => write!(f, "invalid config: {s}"),
            Self::Poisoned(name) => write!(f, "sink '{name}' lock poisoned"),
            Self::AlreadyInstalled => write!(f, "global log facility already installed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}
