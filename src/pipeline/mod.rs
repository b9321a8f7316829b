//! Delivery pipelines: the per-channel half of the async path.
//!
//! A [`Pipeline`] owns a channel's sink list, lifecycle state and counters. It
//! hands records to the shared [`WorkerPool`], and a worker calls back into
//! [`Pipeline::deliver`] to write them.
//!
//! Ordering: records submitted by one thread to one channel are written in
//! submission order. Records from different threads are written in the order
//! they reached the queue, which is not necessarily the order they were
//! emitted. With more than one worker only queue order is guaranteed.

mod pool;
mod state;

pub use pool::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_THREADS, WorkerPool};
pub use state::PipelineState;

pub(crate) use pool::Message;

use crate::internal;
use crate::record::LogRecord;
use crate::sink::Sink;
use state::AtomicState;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Point-in-time counters for one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineStats {
    pub channel: String,
    pub state: PipelineState,
    /// Records accepted into the queue.
    pub submitted: u64,
    /// Records a worker has finished with (written to, or failed on, every sink).
    pub delivered: u64,
    /// Individual sink writes that failed, plus failed final flushes. Panics count too.
    pub failed_writes: u64,
}

pub struct Pipeline {
    channel: Arc<str>,
    /// Emptied when the pipeline stops so file handles close even if a
    /// `Channel` handle outlives the facility.
    sinks: RwLock<Vec<Arc<dyn Sink>>>,
    state: AtomicState,
    submitted: AtomicU64,
    delivered: AtomicU64,
    failed_writes: AtomicU64,
}

impl Pipeline {
    #[must_use]
    pub fn new(channel: Arc<str>, sinks: Vec<Arc<dyn Sink>>) -> Arc<Self> {
        Arc::new(Self {
            channel,
            sinks: RwLock::new(sinks),
            state: AtomicState::new(),
            submitted: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            failed_writes: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    #[must_use]
    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    #[must_use]
    pub fn sink_names(&self) -> Vec<String> {
        self.sinks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            channel: self.channel.to_string(),
            state: self.state(),
            submitted: self.submitted.load(Ordering::Acquire),
            delivered: self.delivered.load(Ordering::Acquire),
            failed_writes: self.failed_writes.load(Ordering::Acquire),
        }
    }

    /// `NotStarted -> Running`. Called once the pool is up.
    pub fn start(&self) {
        if self
            .state
            .advance(PipelineState::NotStarted, PipelineState::Running)
        {
            internal::trace("PIPELINE", &format!("{} running", self.channel));
        }
    }

    /// Queues `record` on `pool`, blocking while the queue is full.
    /// Returns false if the pipeline is not running or the pool has closed.
    pub fn submit(self: &Arc<Self>, pool: &WorkerPool, record: LogRecord) -> bool {
        if self.state() != PipelineState::Running {
            return false;
        }
        // Counted before the send so `delivered` never runs ahead of `submitted`
        self.submitted.fetch_add(1, Ordering::AcqRel);
        let accepted = pool.submit(Message::Record(Arc::clone(self), record));
        if !accepted {
            self.submitted.fetch_sub(1, Ordering::AcqRel);
        }
        accepted
    }

    /// `Running -> Draining`: stop taking new records. The pool still drains
    /// what is already queued.
    pub fn begin_drain(&self) {
        if self
            .state
            .advance(PipelineState::Running, PipelineState::Draining)
        {
            internal::trace("PIPELINE", &format!("{} draining", self.channel));
        }
    }

    /// `Draining -> Stopped`: flushes and releases the sinks. Must only run
    /// after the pool has drained.
    pub fn finish(&self) {
        let sinks = std::mem::take(&mut *self.sinks.write().unwrap_or_else(PoisonError::into_inner));
        for sink in &sinks {
            if let Err(reason) = flush_sink(sink.as_ref()) {
                self.record_failure(sink.name(), &format!("final flush: {reason}"));
            }
        }
        self.state.set(PipelineState::Stopped);

        let stats = self.stats();
        internal::debug(
            "PIPELINE",
            &format!(
                "{} stopped: submitted={} delivered={} failed_writes={}",
                self.channel, stats.submitted, stats.delivered, stats.failed_writes
            ),
        );
    }

    /// Worker side: write `record` to every sink in order. A failing sink is
    /// counted and skipped; the others still get the record.
    pub(crate) fn deliver(&self, record: &LogRecord) {
        let sinks = self.sinks.read().unwrap_or_else(PoisonError::into_inner);
        for sink in sinks.iter() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| sink.write(record)));
            let reason = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(_) => "sink panicked".to_string(),
            };
            self.record_failure(sink.name(), &reason);
        }
        self.delivered.fetch_add(1, Ordering::AcqRel);
    }

    fn record_failure(&self, sink: &str, reason: &str) {
        let failures = self.failed_writes.fetch_add(1, Ordering::AcqRel) + 1;
        // Report the 1st, 2nd, 4th, 8th... failure so a full disk doesn't flood stderr
        if failures.is_power_of_two() {
            internal::error(
                "PIPELINE",
                &format!(
                    "{}: sink '{sink}' failed ({failures} total): {reason}",
                    self.channel
                ),
            );
        }
    }
}

/// Flushes `sink`, turning a panic into an error like `deliver` does for writes.
pub(crate) fn flush_sink(sink: &dyn Sink) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.flush())) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err("sink panicked".to_string()),
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("channel", &self.channel)
            .field("state", &self.state())
            .field("sinks", &self.sink_names())
            .finish_non_exhaustive()
    }
}
