//! Named, leveled log streams.
//!
//! A channel is the only thing producers talk to. It filters by level, stamps a
//! [`LogRecord`] and hands it to its pipeline. Which files the record ends up in
//! is decided by the pipeline's sink list, fixed when the facility starts.

use crate::level::Level;
use crate::pipeline::{Pipeline, PipelineStats, WorkerPool};
use crate::record::{LogRecord, SourceLocation};
use std::sync::Arc;

/// Names of the four channels every server process has.
pub mod names {
    /// General-purpose log, backed by the rotating `syslog.txt`.
    pub const SYSLOG: &str = "syslog";
    /// Errors with source location.
    pub const SYSERR: &str = "syserr";
    pub const PACKET: &str = "packet";
    pub const INSTANCE: &str = "instance";

    /// All built-in names, primary channel first.
    pub const ALL: [&str; 4] = [SYSLOG, SYSERR, PACKET, INSTANCE];
}

#[derive(Debug)]
pub struct Channel {
    name: Arc<str>,
    min_level: Level,
    pipeline: Arc<Pipeline>,
    pool: Arc<WorkerPool>,
}

impl Channel {
    pub(crate) fn new(
        name: Arc<str>,
        min_level: Level,
        pipeline: Arc<Pipeline>,
        pool: Arc<WorkerPool>,
    ) -> Self {
        Self {
            name,
            min_level,
            pipeline,
            pool,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn min_level(&self) -> Level {
        self.min_level
    }

    /// True when a record at `level` would be accepted. The macros call this
    /// before formatting so filtered calls cost nothing.
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.min_level
    }

    /// Queues `text` at `level`. Blocks while the shared queue is full.
    ///
    /// Returns false when the record was filtered or the channel is no longer
    /// running. Neither case is an error for the caller.
    pub fn emit<S: Into<String>>(
        &self,
        level: Level,
        text: S,
        location: Option<SourceLocation>,
    ) -> bool {
        if !self.enabled(level) {
            return false;
        }
        let record = LogRecord::new(level, Arc::clone(&self.name), text.into(), location);
        self.pipeline.submit(&self.pool, record)
    }

    /// Sinks bound to this channel, in write order. Empty once stopped.
    #[must_use]
    pub fn sink_names(&self) -> Vec<String> {
        self.pipeline.sink_names()
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        self.pipeline.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, Sink};

    fn channel(min_level: Level) -> (Channel, Arc<MemorySink>, Arc<WorkerPool>) {
        let mem = Arc::new(MemorySink::new("mem"));
        let sinks: Vec<Arc<dyn Sink>> = vec![mem.clone()];
        let pipeline = Pipeline::new("syslog".into(), sinks);
        pipeline.start();
        let pool = WorkerPool::start(64, 1).unwrap();
        let channel = Channel::new("syslog".into(), min_level, pipeline, Arc::clone(&pool));
        (channel, mem, pool)
    }

    #[test]
    fn below_minimum_is_filtered() {
        let (channel, mem, pool) = channel(Level::Info);
        assert!(!channel.emit(Level::Debug, "quiet", None));
        assert!(channel.emit(Level::Info, "loud", None));
        assert!(channel.emit(Level::Error, "louder", None));
        pool.close();

        assert_eq!(mem.lines(), vec!["loud", "louder"]);
        assert_eq!(channel.stats().submitted, 2);
    }

    #[test]
    fn enabled_follows_min_level() {
        let (channel, _mem, _pool) = channel(Level::Warn);
        assert!(!channel.enabled(Level::Info));
        assert!(channel.enabled(Level::Warn));
        assert_eq!(channel.min_level(), Level::Warn);
        assert_eq!(channel.name(), "syslog");
        assert_eq!(channel.sink_names(), vec!["mem"]);
    }
}
