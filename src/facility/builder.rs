//! Stepwise construction of a [`Facility`]. Nothing is opened here: `build`
//! only validates the layout, files are created by [`Facility::initialize`].

use super::Facility;
use crate::Error;
use crate::channel::names;
use crate::fmt::Pattern;
use crate::internal;
use crate::level::Level;
use crate::pipeline::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_THREADS};
use crate::sink::{ConsoleSink, FileSink, RotatingFileSink, RotationPolicy, Sink, Stream};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default period of the background flush.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(1);

/// How to obtain a sink when the facility starts.
pub enum SinkSpec {
    /// Already constructed, e.g. a [`MemorySink`](crate::sink::MemorySink) kept by a test.
    Ready(Arc<dyn Sink>),
    File {
        path: PathBuf,
        pattern: Pattern,
        truncate: bool,
    },
    Rotating {
        path: PathBuf,
        pattern: Pattern,
        policy: RotationPolicy,
    },
    Console {
        stream: Stream,
        pattern: Pattern,
    },
}

impl SinkSpec {
    fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::File { path, .. } | Self::Rotating { path, .. } => Some(path),
            Self::Ready(_) | Self::Console { .. } => None,
        }
    }

    pub(super) fn open(&self, name: &str) -> Result<Arc<dyn Sink>, Error> {
        let sink: Arc<dyn Sink> = match self {
            Self::Ready(sink) => return Ok(Arc::clone(sink)),
            Self::File {
                path,
                pattern,
                truncate,
            } => Arc::new(FileSink::open(name, path, pattern.clone(), *truncate)?),
            Self::Rotating {
                path,
                pattern,
                policy,
            } => Arc::new(RotatingFileSink::open(
                name,
                path,
                pattern.clone(),
                policy.clone(),
            )?),
            Self::Console { stream, pattern } => {
                Arc::new(ConsoleSink::new(name, *stream, pattern.clone()))
            }
        };
        Ok(sink)
    }
}

impl std::fmt::Debug for SinkSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(sink) => f.debug_tuple("Ready").field(&sink.name()).finish(),
            Self::File { path, truncate, .. } => f
                .debug_struct("File")
                .field("path", path)
                .field("truncate", truncate)
                .finish_non_exhaustive(),
            Self::Rotating { path, policy, .. } => f
                .debug_struct("Rotating")
                .field("path", path)
                .field("policy", policy)
                .finish_non_exhaustive(),
            Self::Console { stream, .. } => f
                .debug_struct("Console")
                .field("stream", stream)
                .finish_non_exhaustive(),
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct ChannelSpec {
    pub(super) name: String,
    pub(super) level: Level,
    pub(super) sinks: Vec<String>,
}

/// Validated layout a facility is started from.
#[derive(Debug)]
pub(super) struct Plan {
    pub(super) queue_capacity: usize,
    pub(super) worker_threads: usize,
    pub(super) flush_interval: Option<Duration>,
    pub(super) primary: Option<String>,
    pub(super) sinks: Vec<(String, SinkSpec)>,
    pub(super) channels: Vec<ChannelSpec>,
}

#[derive(Debug)]
pub struct FacilityBuilder {
    queue_capacity: usize,
    worker_threads: usize,
    flush_interval: Option<Duration>,
    primary: Option<String>,
    sinks: Vec<(String, SinkSpec)>,
    channels: Vec<ChannelSpec>,
}

impl Default for FacilityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FacilityBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_threads: DEFAULT_WORKER_THREADS,
            flush_interval: Some(DEFAULT_FLUSH_INTERVAL),
            primary: None,
            sinks: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// Records the shared queue holds before producers block.
    #[must_use]
    pub const fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// More than one worker gives up per-channel write order.
    #[must_use]
    pub const fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// `None` disables the background flush.
    #[must_use]
    pub const fn flush_interval(mut self, interval: Option<Duration>) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Channel that receives the startup line and backs `sys_log`.
    #[must_use]
    pub fn primary(mut self, channel: impl Into<String>) -> Self {
        self.primary = Some(channel.into());
        self
    }

    /// Registers a sink under `name`.
    #[must_use]
    pub fn sink_spec(mut self, name: impl Into<String>, spec: SinkSpec) -> Self {
        self.sinks.push((name.into(), spec));
        self
    }

    /// Registers an already constructed sink.
    #[must_use]
    pub fn sink(self, name: impl Into<String>, sink: Arc<dyn Sink>) -> Self {
        self.sink_spec(name, SinkSpec::Ready(sink))
    }

    #[must_use]
    pub fn file_sink(
        self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        pattern: Pattern,
        truncate: bool,
    ) -> Self {
        self.sink_spec(
            name,
            SinkSpec::File {
                path: path.into(),
                pattern,
                truncate,
            },
        )
    }

    #[must_use]
    pub fn rotating_sink(
        self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        pattern: Pattern,
        policy: RotationPolicy,
    ) -> Self {
        self.sink_spec(
            name,
            SinkSpec::Rotating {
                path: path.into(),
                pattern,
                policy,
            },
        )
    }

    #[must_use]
    pub fn console_sink(self, name: impl Into<String>, stream: Stream, pattern: Pattern) -> Self {
        self.sink_spec(name, SinkSpec::Console { stream, pattern })
    }

    /// Declares a channel writing to `sinks` in the given order.
    #[must_use]
    pub fn channel(mut self, name: impl Into<String>, level: Level, sinks: &[&str]) -> Self {
        self.channels.push(ChannelSpec {
            name: name.into(),
            level,
            sinks: sinks.iter().map(|s| (*s).to_string()).collect(),
        });
        self
    }

    /// The four server channels over `base_dir`: each writes its own file and
    /// tees into the combined `log.txt`.
    #[must_use]
    pub fn server_layout(self, base_dir: impl Into<PathBuf>, level: Level) -> Self {
        let base: PathBuf = base_dir.into();
        let plain = || Pattern::parse(super::PLAIN_PATTERN);

        self.primary(names::SYSLOG)
            .file_sink("combined", base.join("log.txt"), Pattern::parse(super::COMBINED_PATTERN), true)
            .file_sink("syserr", base.join("syserr.txt"), Pattern::parse(super::ERROR_PATTERN), true)
            .file_sink("packet", base.join("packets.txt"), plain(), true)
            .file_sink("instance", base.join("instance.txt"), plain(), true)
            .rotating_sink("syslog", base.join("syslog.txt"), plain(), RotationPolicy::default().max_size(16 * 1024 * 1024))
            .channel(names::SYSLOG, level, &["syslog", "combined"])
            .channel(names::SYSERR, Level::Info, &["syserr", "combined"])
            .channel(names::PACKET, level, &["packet", "combined"])
            .channel(names::INSTANCE, level, &["instance", "combined"])
    }

    /// Checks the layout and returns an uninitialized facility.
    ///
    /// # Errors
    /// Zero capacity or workers, duplicate or unnamed channels and sinks, channels
    /// without sinks or with unknown sinks, two sinks on one file, and a primary
    /// channel that was never declared.
    pub fn build(self) -> Result<Facility, Error> {
        self.validate()?;
        Ok(Facility::from_plan(Plan {
            queue_capacity: self.queue_capacity,
            worker_threads: self.worker_threads,
            flush_interval: self.flush_interval,
            primary: self.primary,
            sinks: self.sinks,
            channels: self.channels,
        }))
    }

    fn validate(&self) -> Result<(), Error> {
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig("queue capacity must be > 0".to_string()));
        }
        if self.worker_threads == 0 {
            return Err(Error::InvalidConfig("worker threads must be > 0".to_string()));
        }
        if self.flush_interval.is_some_and(|d| d.is_zero()) {
            return Err(Error::InvalidConfig("flush interval must be > 0".to_string()));
        }

        let mut sink_names = HashSet::new();
        let mut paths = HashSet::new();
        for (name, spec) in &self.sinks {
            if name.is_empty() {
                return Err(Error::InvalidConfig("sink name must not be empty".to_string()));
            }
            if !sink_names.insert(name.as_str()) {
                return Err(Error::InvalidConfig(format!("duplicate sink: {name}")));
            }
            if let Some(path) = spec.path() {
                if !paths.insert(path) {
                    return Err(Error::InvalidConfig(format!(
                        "sink '{name}' opens {} which another sink already writes",
                        path.display()
                    )));
                }
            }
        }

        let mut channel_names = HashSet::new();
        let mut used = HashSet::new();
        for channel in &self.channels {
            if channel.name.is_empty() {
                return Err(Error::InvalidConfig("channel name must not be empty".to_string()));
            }
            if !channel_names.insert(channel.name.as_str()) {
                return Err(Error::DuplicateChannel(channel.name.clone()));
            }
            if channel.sinks.is_empty() {
                return Err(Error::EmptyChannel(channel.name.clone()));
            }
            let mut bound = HashSet::new();
            for sink in &channel.sinks {
                if !sink_names.contains(sink.as_str()) {
                    return Err(Error::UnknownSink {
                        channel: channel.name.clone(),
                        sink: sink.clone(),
                    });
                }
                if !bound.insert(sink.as_str()) {
                    return Err(Error::InvalidConfig(format!(
                        "channel '{}' lists sink '{sink}' twice",
                        channel.name
                    )));
                }
                used.insert(sink.as_str());
            }
        }

        if let Some(primary) = &self.primary {
            if !channel_names.contains(primary.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "primary channel '{primary}' is not declared"
                )));
            }
        }

        for name in sink_names.difference(&used) {
            internal::warn("BUILDER", &format!("Sink '{name}' is not bound to any channel"));
        }
        Ok(())
    }
}
