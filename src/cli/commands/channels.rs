//! Channels command implementation.

use crate::config::{Config, parse_level};
use std::process::ExitCode;

/// Handles `chanlog channels`: one line per channel, primary marked with `*`.
#[must_use]
pub fn cmd_channels(config: &Config) -> ExitCode {
    for (name, channel) in &config.channels {
        let marker = if *name == config.general.primary_channel { "*" } else { " " };
        let level = parse_level(&channel.level)
            .map_or_else(|_| format!("{}?", channel.level), |l| l.to_string());
        println!("{marker} {name:<12} {level:<6} {}", channel.sinks.join(", "));
    }
    ExitCode::SUCCESS
}
