//! `chanlog` - asynchronous multi-channel logging for long-running servers.
//!
//! Records are routed from named channels (`syslog`, `syserr`, `packet`,
//! `instance`) to one or more sinks through a shared bounded queue drained by a
//! worker thread. Producers block when the queue is full; nothing is dropped.
//!
//! # Example
//!
//! ```
//! use chanlog::{Facility, Level, MemorySink};
//! use std::sync::Arc;
//!
//! let mem = Arc::new(MemorySink::new("mem"));
//! let facility = Facility::builder()
//!     .sink("mem", mem.clone())
//!     .channel("packet", Level::Info, &["mem"])
//!     .build()
//!     .unwrap();
//!
//! facility.initialize().unwrap();
//! facility.sys_packet("login ok");
//! facility.teardown();
//!
//! assert_eq!(mem.lines(), vec!["login ok"]);
//! ```
//!
//! Servers usually install one facility process-wide and log through the macros:
//!
//! ```no_run
//! use chanlog::{Config, Level};
//!
//! let _guard = chanlog::init_global(&Config::load()?)?;
//! chanlog::sys_log!(Level::Info, "listening on {}", 13000);
//! chanlog::sys_err!("bad packet header {:#x}", 0x7f);
//! # Ok::<(), chanlog::Error>(())
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `chanlog` binary and its command handlers

mod error;
mod macros;
mod record;

pub mod channel;
pub mod config;
pub mod facility;
pub mod fmt;
pub mod global;
pub mod internal;
pub mod level;
pub mod pipeline;
pub mod sink;

#[cfg(feature = "cli")]
pub mod cli;

pub use channel::Channel;
pub use config::Config;
pub use error::Error;
pub use facility::{Facility, FacilityBuilder, FacilityState, SinkSpec};
pub use fmt::{FORMAT_CAPACITY, Pattern, format_template};
pub use global::{ShutdownGuard, init_global, install, shutdown};
pub use level::Level;
pub use pipeline::{PipelineState, PipelineStats};
pub use record::{LogRecord, SourceLocation};
pub use sink::{
    ConsoleSink, FileSink, MemorySink, RotatingFileSink, RotationPolicy, Sink, Stream,
};
