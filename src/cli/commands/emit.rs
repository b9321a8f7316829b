//! Emit command implementation.

use crate::config::Config;
use crate::facility::Facility;
use crate::internal;
use crate::level::Level;
use std::process::ExitCode;

/// Handles `chanlog emit <channel> <level> <message...>`.
///
/// Opens only `channel` and its sinks, in append mode, so running it next to a
/// live server adds one record without touching anything else. The record is
/// on disk when the command returns.
#[must_use]
pub fn cmd_emit(config: &Config, channel: &str, level: Level, message: &[String]) -> ExitCode {
    let Some(narrowed) = single_channel(config, channel) else {
        internal::error("EMIT", &format!("Unknown channel: {channel}"));
        return ExitCode::FAILURE;
    };
    let facility = match Facility::from_config_with(&narrowed) {
        Ok(f) => f,
        Err(e) => {
            internal::error("EMIT", &format!("{e}"));
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = facility.initialize() {
        internal::error("EMIT", &format!("Failed to open sinks: {e}"));
        return ExitCode::FAILURE;
    }

    let text = crate::format_bounded!("{}", message.join(" "));
    let location = (channel == crate::channel::names::SYSERR).then(|| crate::source_location!());
    let accepted = facility.emit(channel, level, text, location);
    facility.teardown();

    if !accepted {
        internal::warn(
            "EMIT",
            &format!("'{channel}' filtered the record at level {level}"),
        );
    }
    ExitCode::SUCCESS
}

/// `config` cut down to `channel` and the sinks it writes to. Files are
/// appended to and no startup line is written.
fn single_channel(config: &Config, channel: &str) -> Option<Config> {
    let target = config.channels.get(channel)?.clone();
    let mut narrowed = config.clone();

    narrowed.sinks.retain(|name, _| target.sinks.contains(name));
    for sink in narrowed.sinks.values_mut() {
        sink.truncate = false;
    }
    narrowed.channels.clear();
    narrowed.channels.insert(channel.to_string(), target);
    narrowed.general.primary_channel = String::new();
    narrowed.general.flush_interval_ms = 0;
    Some(narrowed)
}
