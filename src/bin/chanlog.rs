//! `chanlog` binary.
//!
//! Usage:
//!   chanlog [--config <path>] emit <channel> <level> <msg...>
//!   chanlog [--config <path>] channels
//!   chanlog [--config <path>] check
//!   chanlog [--config <path>] stats

use chanlog::cli::{Cli, Command, cmd_channels, cmd_check, cmd_emit, cmd_stats, load_config};
use chanlog::internal;
use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            internal::error("CLI", &format!("Error loading config: {e}"));
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Emit {
            channel,
            level,
            message,
        } => cmd_emit(&config, &channel, level.into(), &message),
        Command::Channels => cmd_channels(&config),
        Command::Check => cmd_check(&config),
        Command::Stats => cmd_stats(&config),
    }
}
