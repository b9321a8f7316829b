//! The process-wide facility behind the `sys_*!` macros.
//!
//! Installed once. The returned [`ShutdownGuard`] tears the facility down when
//! it goes out of scope, which is how a server's `main` makes sure the queue is
//! drained on every exit path that unwinds.

use crate::Error;
use crate::config::Config;
use crate::facility::Facility;
use crate::internal;
use crate::level::Level;
use crate::record::SourceLocation;
use std::sync::OnceLock;

static FACILITY: OnceLock<Facility> = OnceLock::new();

/// Tears the global facility down on drop. Keep it alive in `main`.
#[must_use = "dropping the guard shuts the log facility down immediately"]
#[derive(Debug)]
pub struct ShutdownGuard {
    _private: (),
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        shutdown();
    }
}

/// Initializes `facility` and makes it the process-wide one.
///
/// # Errors
/// `Error::AlreadyInstalled` when a facility is already installed, otherwise
/// whatever [`Facility::initialize`] reports. Nothing is installed on error.
pub fn install(facility: Facility) -> Result<ShutdownGuard, Error> {
    if FACILITY.get().is_some() {
        return Err(Error::AlreadyInstalled);
    }
    facility.initialize()?;
    // Lost a race with another installer; the rejected facility drains on drop
    FACILITY.set(facility).map_err(|_| Error::AlreadyInstalled)?;
    Ok(ShutdownGuard { _private: () })
}

/// Builds the facility described by `config` and installs it.
///
/// # Errors
/// See [`Facility::from_config_with`] and [`install`].
pub fn init_global(config: &Config) -> Result<ShutdownGuard, Error> {
    install(Facility::from_config_with(config)?)
}

/// The installed facility, if any. It may already be shut down.
#[must_use]
pub fn facility() -> Option<&'static Facility> {
    FACILITY.get()
}

/// Tears the global facility down. Safe to call repeatedly and before install.
pub fn shutdown() {
    if let Some(facility) = FACILITY.get() {
        internal::debug("GLOBAL", "Shutting down global facility");
        facility.teardown();
    }
}

/// True when `channel` on the global facility would accept `level`.
#[must_use]
pub fn enabled(channel: &str, level: Level) -> bool {
    FACILITY.get().is_some_and(|f| f.enabled(channel, level))
}

/// Macro backend: `format` only runs when the record will be accepted.
/// `None` targets the primary channel.
#[doc(hidden)]
pub fn emit_with(
    channel: Option<&str>,
    level: Level,
    location: Option<SourceLocation>,
    format: impl FnOnce() -> String,
) -> bool {
    let Some(facility) = FACILITY.get() else {
        return false;
    };
    let Some(channel) = facility.channel(channel.unwrap_or_else(|| facility.primary())) else {
        return false;
    };
    channel.enabled(level) && channel.emit(level, format(), location)
}

pub fn sys_err(text: String, location: SourceLocation) -> bool {
    FACILITY.get().is_some_and(|f| f.sys_err(text, location))
}

pub fn sys_log(level: Level, text: String) -> bool {
    FACILITY.get().is_some_and(|f| f.sys_log(level, text))
}

pub fn sys_packet(text: String) -> bool {
    FACILITY.get().is_some_and(|f| f.sys_packet(text))
}

pub fn sys_instance(text: String) -> bool {
    FACILITY.get().is_some_and(|f| f.sys_instance(text))
}
