//! Command-line interface for inspecting and exercising a chanlog layout.

pub mod commands;

use crate::config::Config;
use crate::internal;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Log level for CLI arguments.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for crate::level::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::Trace,
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

/// chanlog - multi-channel server logging.
#[derive(Parser)]
#[command(name = "chanlog", version, about = "Inspect and exercise a chanlog layout")]
pub struct Cli {
    /// Config file instead of `<config_dir>/chanlog/chanlog.toml`
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Write one record through the configured layout.
    Emit {
        /// Channel name, e.g. syslog
        channel: String,
        /// Log level
        #[arg(value_enum)]
        level: LogLevel,
        /// Message words, joined with spaces
        #[arg(required = true)]
        message: Vec<String>,
    },
    /// List channels with their level and sinks.
    Channels,
    /// Validate the config without opening any file.
    Check,
    /// Show the size of every file the layout writes, rotated backups included.
    Stats,
}

/// Loads `path` when given, the default config otherwise.
///
/// # Errors
/// Whatever [`Config::load`] or [`Config::load_from`] reports.
pub fn load_config(path: Option<&Path>) -> Result<Config, crate::Error> {
    match path {
        Some(path) => {
            internal::debug("CLI", &format!("Using config {}", path.display()));
            Config::load_from(path)
        }
        None => Config::load(),
    }
}

pub use commands::{cmd_channels, cmd_check, cmd_emit, cmd_stats};
