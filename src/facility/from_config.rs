//! Facility construction from a loaded [`Config`].

use super::{Facility, FacilityBuilder, SinkSpec};
use crate::Error;
use crate::config::{Config, SinkConfig, SinkKind, parse_level};
use crate::fmt::Pattern;
use crate::internal;
use crate::sink::{RotationPolicy, Stream, parse_size};
use std::time::Duration;

impl Facility {
    /// Builds an uninitialized facility from the default config file.
    ///
    /// # Errors
    /// Config load errors and everything [`from_config_with`](Self::from_config_with) rejects.
    pub fn from_config() -> Result<Self, Error> {
        Self::from_config_with(&Config::load()?)
    }

    /// Builds an uninitialized facility from `config`. Also fixes the internal
    /// diagnostic threshold when `general.internal_level` is set.
    ///
    /// # Errors
    /// Unknown level names, unparsable sizes, file sinks without a path and
    /// every layout error [`FacilityBuilder::build`] reports.
    pub fn from_config_with(config: &Config) -> Result<Self, Error> {
        let general = &config.general;
        if let Some(level) = &general.internal_level {
            internal::init(parse_level(level)?);
        }

        let flush_interval = match general.flush_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        let mut builder = FacilityBuilder::new()
            .queue_capacity(general.queue_capacity)
            .worker_threads(general.worker_threads)
            .flush_interval(flush_interval);
        if !general.primary_channel.is_empty() {
            builder = builder.primary(general.primary_channel.clone());
        }

        for (name, sink) in &config.sinks {
            builder = builder.sink_spec(name.clone(), sink_spec(config, name, sink)?);
        }
        for (name, channel) in &config.channels {
            let level = parse_level(&channel.level)?;
            let sinks: Vec<&str> = channel.sinks.iter().map(String::as_str).collect();
            builder = builder.channel(name.clone(), level, &sinks);
        }

        internal::debug(
            "CONFIG",
            &format!(
                "Layout: {} sink(s), {} channel(s) under {}",
                config.sinks.len(),
                config.channels.len(),
                config.base_dir().display()
            ),
        );
        builder.build()
    }
}

fn sink_spec(config: &Config, name: &str, sink: &SinkConfig) -> Result<SinkSpec, Error> {
    let pattern =
        Pattern::parse(&sink.pattern).timestamp_format(config.general.timestamp_format.clone());

    let path = || {
        sink.path
            .as_deref()
            .map(|p| config.resolve_path(p))
            .ok_or_else(|| Error::InvalidConfig(format!("sink '{name}' needs a path")))
    };

    Ok(match sink.kind {
        SinkKind::File => SinkSpec::File {
            path: path()?,
            pattern,
            truncate: sink.truncate,
        },
        SinkKind::Rotating => {
            let mut policy = RotationPolicy::default()
                .daily(sink.daily)
                .max_files(sink.max_files)
                .compress(sink.compress);
            if let Some(size) = &sink.max_size {
                let bytes = parse_size(size).ok_or_else(|| Error::InvalidSize(size.clone()))?;
                policy = policy.max_size(bytes);
            }
            SinkSpec::Rotating {
                path: path()?,
                pattern,
                policy,
            }
        }
        SinkKind::Stdout => SinkSpec::Console {
            stream: Stream::Stdout,
            pattern,
        },
        SinkKind::Stderr => SinkSpec::Console {
            stream: Stream::Stderr,
            pattern,
        },
    })
}
