//! chanlog's own diagnostics: sink failures, config warnings, lifecycle changes.
//!
//! These cannot go through the facility itself (a failing sink would report into
//! the queue it is failing to drain), so they are written straight to stderr.
//! The threshold is fixed once through `OnceLock`; the first caller wins.

use crate::level::Level;
use std::io::Write;
use std::sync::OnceLock;

/// Environment override consulted when nobody calls [`init`] first.
pub const LEVEL_ENV: &str = "CHANLOG_INTERNAL_LEVEL";

static THRESHOLD: OnceLock<Level> = OnceLock::new();

/// Fixes the diagnostic threshold. Later calls are no-ops.
pub fn init(level: Level) {
    if THRESHOLD.set(level).is_ok() {
        debug("INTERNAL", &format!("Internal diagnostics at {level}"));
    }
}

fn threshold() -> Level {
    *THRESHOLD.get_or_init(|| {
        std::env::var(LEVEL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Level::Warn)
    })
}

/// True when a diagnostic at `level` would be printed.
#[must_use]
pub fn enabled(level: Level) -> bool {
    level >= threshold()
}

fn log(level: Level, scope: &str, msg: &str) {
    if !enabled(level) {
        return;
    }
    // stderr may be closed in a daemonized server; losing a diagnostic is fine
    let _ = writeln!(std::io::stderr().lock(), "chanlog {level:>5} {scope:<10} {msg}");
}

/// High-volume instrumentation, e.g. every rotation check.
pub fn trace(scope: &str, msg: &str) {
    log(Level::Trace, scope, msg);
}

/// Lifecycle transitions and config resolution details.
pub fn debug(scope: &str, msg: &str) {
    log(Level::Debug, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Level::Info, scope, msg);
}

/// Recoverable anomalies: missing include files, re-init after shutdown.
pub fn warn(scope: &str, msg: &str) {
    log(Level::Warn, scope, msg);
}

/// Delivery failures. Never propagated to producers, so this is their only trace.
pub fn error(scope: &str, msg: &str) {
    log(Level::Error, scope, msg);
}
