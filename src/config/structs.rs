//! Configuration struct definitions.

use crate::channel::names;
use crate::facility::{COMBINED_PATTERN, ERROR_PATTERN, PLAIN_PATTERN};
use crate::fmt::DEFAULT_TIMESTAMP_FORMAT;
use crate::pipeline::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_THREADS};
use serde::Deserialize;

/// Level of the general, packet and instance channels when the config leaves it out.
#[must_use]
pub const fn default_level() -> &'static str {
    if cfg!(debug_assertions) { "debug" } else { "info" }
}

/// General configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory relative sink paths are resolved against. `~` is expanded.
    pub base_dir: String,
    /// Shared queue capacity in records.
    pub queue_capacity: usize,
    /// Worker threads draining the queue.
    pub worker_threads: usize,
    /// Background flush period; `0` turns it off.
    pub flush_interval_ms: u64,
    /// strftime format for `{timestamp}`.
    pub timestamp_format: String,
    /// Channel receiving the startup line and `sys_log` records. Empty skips
    /// the startup line and leaves `sys_log` on `syslog`.
    pub primary_channel: String,
    /// Threshold for chanlog's own stderr diagnostics.
    pub internal_level: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            base_dir: ".".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_threads: DEFAULT_WORKER_THREADS,
            flush_interval_ms: 1000,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            primary_channel: names::SYSLOG.to_string(),
            internal_level: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    #[default]
    File,
    Rotating,
    Stdout,
    Stderr,
}

/// One `[sinks.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Required for `file` and `rotating`. Relative paths live under `base_dir`.
    pub path: Option<String>,
    pub pattern: String,
    /// Discard the previous content on open instead of appending.
    pub truncate: bool,
    /// Rotation size threshold such as `16M`.
    pub max_size: Option<String>,
    /// Rotated backups kept.
    pub max_files: usize,
    /// Rotate at the first write after midnight.
    pub daily: bool,
    /// Gzip rotated backups.
    pub compress: bool,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::File,
            path: None,
            pattern: PLAIN_PATTERN.to_string(),
            truncate: true,
            max_size: None,
            max_files: 5,
            daily: false,
            compress: false,
        }
    }
}

impl SinkConfig {
    fn file(path: &str, pattern: &str) -> Self {
        Self {
            path: Some(path.to_string()),
            pattern: pattern.to_string(),
            ..Self::default()
        }
    }
}

/// One `[channels.<name>]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Minimum level, e.g. `info`.
    pub level: String,
    /// Sink names in write order.
    pub sinks: Vec<String>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            level: default_level().to_string(),
            sinks: Vec::new(),
        }
    }
}

impl ChannelConfig {
    fn new(level: &str, sinks: &[&str]) -> Self {
        Self {
            level: level.to_string(),
            sinks: sinks.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

/// The server layout: one file per channel, all of them teed into `log.txt`,
/// the primary channel on a rotating `syslog.txt`.
pub(super) fn default_sinks() -> Vec<(&'static str, SinkConfig)> {
    vec![
        ("combined", SinkConfig::file("log.txt", COMBINED_PATTERN)),
        ("syserr", SinkConfig::file("syserr.txt", ERROR_PATTERN)),
        ("packet", SinkConfig::file("packets.txt", PLAIN_PATTERN)),
        ("instance", SinkConfig::file("instance.txt", PLAIN_PATTERN)),
        (
            "syslog",
            SinkConfig {
                kind: SinkKind::Rotating,
                truncate: false,
                max_size: Some("16M".to_string()),
                ..SinkConfig::file("syslog.txt", PLAIN_PATTERN)
            },
        ),
    ]
}

pub(super) fn default_channels() -> Vec<(&'static str, ChannelConfig)> {
    vec![
        (names::SYSLOG, ChannelConfig::new(default_level(), &["syslog", "combined"])),
        (names::SYSERR, ChannelConfig::new("info", &["syserr", "combined"])),
        (names::PACKET, ChannelConfig::new(default_level(), &["packet", "combined"])),
        (names::INSTANCE, ChannelConfig::new(default_level(), &["instance", "combined"])),
    ]
}
