//! Check command implementation.

use crate::config::Config;
use crate::facility::Facility;
use crate::internal;
use std::process::ExitCode;

/// Handles `chanlog check`. Validation stops short of creating files.
#[must_use]
pub fn cmd_check(config: &Config) -> ExitCode {
    match Facility::from_config_with(config) {
        Ok(facility) => {
            println!(
                "ok: {} channel(s), {} sink(s), base dir {}",
                facility.channel_names().len(),
                config.sinks.len(),
                config.base_dir().display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            internal::error("CHECK", &format!("Invalid config: {e}"));
            ExitCode::FAILURE
        }
    }
}
