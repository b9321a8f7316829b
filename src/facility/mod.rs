//! The process-level registry of channels and its lifecycle.
//!
//! ```text
//! Uninitialized --initialize--> Initialized --teardown--> ShutDown
//! ```
//!
//! Both transitions are idempotent and there is no way back from `ShutDown`.
//! The channel table is built once in `initialize` and never changes
//! afterwards, so lookups only need the read side of the lifecycle lock.

mod builder;
mod flusher;
mod from_config;

pub use builder::{DEFAULT_FLUSH_INTERVAL, FacilityBuilder, SinkSpec};

use crate::Error;
use crate::channel::{Channel, names};
use crate::internal;
use crate::level::Level;
use crate::pipeline::{Message, Pipeline, PipelineStats, WorkerPool};
use crate::record::SourceLocation;
use crate::sink::Sink;
use builder::Plan;
use flusher::Flusher;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, mpsc};

/// Combined file layout: every channel, tagged with its name.
pub const COMBINED_PATTERN: &str = "[{timestamp}] [{level}] [{channel}] {msg}";
/// Error file layout: where the error was raised.
pub const ERROR_PATTERN: &str = "[{timestamp}] [{level}] [{file}:{line} {func}] {msg}";
/// Layout of the per-channel files.
pub const PLAIN_PATTERN: &str = "[{timestamp}] [{level}] {msg}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilityState {
    Uninitialized,
    Initialized,
    ShutDown,
}

impl std::fmt::Display for FacilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Initialized => "initialized",
            Self::ShutDown => "shut down",
        })
    }
}

enum Lifecycle {
    Uninitialized,
    Initialized(Runtime),
    ShutDown,
}

/// Everything that only exists while the facility is initialized.
struct Runtime {
    pool: Arc<WorkerPool>,
    channels: HashMap<String, Arc<Channel>>,
    /// Declaration order, for stats and teardown.
    pipelines: Vec<Arc<Pipeline>>,
    /// Every opened sink once, shared sinks included only once.
    sinks: Arc<[Arc<dyn Sink>]>,
    flusher: Option<Flusher>,
}

impl Runtime {
    fn start(plan: &Plan) -> Result<Self, Error> {
        let mut opened: HashMap<&str, Arc<dyn Sink>> = HashMap::with_capacity(plan.sinks.len());
        let mut sinks = Vec::with_capacity(plan.sinks.len());
        for (name, spec) in &plan.sinks {
            let sink = spec.open(name)?;
            opened.insert(name.as_str(), Arc::clone(&sink));
            sinks.push(sink);
        }

        let pool = WorkerPool::start(plan.queue_capacity, plan.worker_threads)?;

        let mut channels = HashMap::with_capacity(plan.channels.len());
        let mut pipelines = Vec::with_capacity(plan.channels.len());
        for spec in &plan.channels {
            let bound = spec
                .sinks
                .iter()
                .map(|name| {
                    opened.get(name.as_str()).cloned().ok_or_else(|| Error::UnknownSink {
                        channel: spec.name.clone(),
                        sink: name.clone(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let name: Arc<str> = Arc::from(spec.name.as_str());
            let pipeline = Pipeline::new(Arc::clone(&name), bound);
            pipeline.start();
            let channel = Channel::new(name, spec.level, Arc::clone(&pipeline), Arc::clone(&pool));
            channels.insert(spec.name.clone(), Arc::new(channel));
            pipelines.push(pipeline);
        }

        let sinks: Arc<[Arc<dyn Sink>]> = sinks.into();
        let flusher = match plan.flush_interval {
            Some(interval) => Some(Flusher::spawn(interval, Arc::clone(&pool), Arc::clone(&sinks))?),
            None => None,
        };

        Ok(Self {
            pool,
            channels,
            pipelines,
            sinks,
            flusher,
        })
    }

    fn shutdown(mut self) {
        if let Some(flusher) = self.flusher.take() {
            flusher.stop();
        }
        for pipeline in &self.pipelines {
            pipeline.begin_drain();
        }
        // Producers that got past the state check are still let in; close waits for them
        self.pool.close();
        for pipeline in &self.pipelines {
            pipeline.finish();
        }
    }
}

/// A set of channels sharing one worker pool.
///
/// Built with [`Facility::builder`] or [`Facility::from_config`], started with
/// [`initialize`](Self::initialize). Dropping an initialized facility tears it
/// down, which drains everything already queued.
pub struct Facility {
    plan: Plan,
    lifecycle: RwLock<Lifecycle>,
}

impl Facility {
    #[must_use]
    pub fn builder() -> FacilityBuilder {
        FacilityBuilder::new()
    }

    fn from_plan(plan: Plan) -> Self {
        Self {
            plan,
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
        }
    }

    #[must_use]
    pub fn state(&self) -> FacilityState {
        match *self.lifecycle.read().unwrap_or_else(PoisonError::into_inner) {
            Lifecycle::Uninitialized => FacilityState::Uninitialized,
            Lifecycle::Initialized(_) => FacilityState::Initialized,
            Lifecycle::ShutDown => FacilityState::ShutDown,
        }
    }

    /// Opens every sink, starts the workers and the periodic flush.
    ///
    /// Does nothing when already initialized. After [`teardown`](Self::teardown)
    /// the facility stays shut down and this only logs a warning.
    ///
    /// # Errors
    /// Sink open failures and thread spawn failures. The facility is left
    /// uninitialized and can be retried.
    pub fn initialize(&self) -> Result<(), Error> {
        {
            let mut lifecycle = self.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
            match *lifecycle {
                Lifecycle::Initialized(_) => return Ok(()),
                Lifecycle::ShutDown => {
                    internal::warn("FACILITY", "initialize after teardown ignored");
                    return Ok(());
                }
                Lifecycle::Uninitialized => {}
            }

            let runtime = Runtime::start(&self.plan)?;
            internal::debug(
                "FACILITY",
                &format!(
                    "Initialized {} channel(s), {} sink(s)",
                    runtime.channels.len(),
                    runtime.sinks.len()
                ),
            );
            *lifecycle = Lifecycle::Initialized(runtime);
        }

        if let Some(primary) = &self.plan.primary {
            self.emit(
                primary,
                Level::Info,
                format!(
                    "log facility started: {} channel(s), queue {}, {} worker(s)",
                    self.plan.channels.len(),
                    self.plan.queue_capacity,
                    self.plan.worker_threads
                ),
                None,
            );
        }
        Ok(())
    }

    /// Drains every queued record, flushes and closes all sinks.
    ///
    /// A no-op unless initialized. Returns once the workers have exited.
    pub fn teardown(&self) {
        let mut lifecycle = self.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
        match std::mem::replace(&mut *lifecycle, Lifecycle::ShutDown) {
            Lifecycle::Initialized(runtime) => {
                // The lock stays held until the drain completes, so a concurrent
                // teardown returns only afterwards
                runtime.shutdown();
                internal::debug("FACILITY", "Shut down");
            }
            previous => *lifecycle = previous,
        }
    }

    /// Handle to a channel. `None` for unknown names and outside the
    /// initialized state.
    #[must_use]
    pub fn channel(&self, name: &str) -> Option<Arc<Channel>> {
        match &*self.lifecycle.read().unwrap_or_else(PoisonError::into_inner) {
            Lifecycle::Initialized(runtime) => runtime.channels.get(name).cloned(),
            Lifecycle::Uninitialized | Lifecycle::ShutDown => None,
        }
    }

    /// Declared channel names, in declaration order.
    #[must_use]
    pub fn channel_names(&self) -> Vec<String> {
        self.plan.channels.iter().map(|c| c.name.clone()).collect()
    }

    /// Counters per channel, in declaration order. Empty unless initialized.
    #[must_use]
    pub fn stats(&self) -> Vec<PipelineStats> {
        match &*self.lifecycle.read().unwrap_or_else(PoisonError::into_inner) {
            Lifecycle::Initialized(runtime) => runtime.pipelines.iter().map(|p| p.stats()).collect(),
            Lifecycle::Uninitialized | Lifecycle::ShutDown => Vec::new(),
        }
    }

    /// True when `channel` exists and would accept a record at `level`.
    #[must_use]
    pub fn enabled(&self, channel: &str, level: Level) -> bool {
        self.channel(channel).is_some_and(|c| c.enabled(level))
    }

    /// Routes `text` to `channel`. Unknown channels, filtered levels and an
    /// uninitialized or shut down facility all make this a silent no-op.
    pub fn emit<S: Into<String>>(
        &self,
        channel: &str,
        level: Level,
        text: S,
        location: Option<SourceLocation>,
    ) -> bool {
        // The lifecycle lock is released before a possibly blocking submit
        self.channel(channel)
            .is_some_and(|c| c.emit(level, text, location))
    }

    /// Error channel, with the caller's location.
    pub fn sys_err<S: Into<String>>(&self, text: S, location: SourceLocation) -> bool {
        self.emit(names::SYSERR, Level::Error, text, Some(location))
    }

    /// Primary channel at `level`.
    pub fn sys_log<S: Into<String>>(&self, level: Level, text: S) -> bool {
        self.emit(self.primary(), level, text, None)
    }

    /// Primary channel with a legacy numeric verbosity, see [`Level::from_legacy`].
    pub fn sys_log_legacy<S: Into<String>>(&self, verbosity: i32, text: S) -> bool {
        self.sys_log(Level::from_legacy(verbosity), text)
    }

    pub fn sys_packet<S: Into<String>>(&self, text: S) -> bool {
        self.emit(names::PACKET, Level::Info, text, None)
    }

    pub fn sys_instance<S: Into<String>>(&self, text: S) -> bool {
        self.emit(names::INSTANCE, Level::Info, text, None)
    }

    /// Name of the primary channel, `syslog` unless configured otherwise.
    #[must_use]
    pub fn primary(&self) -> &str {
        self.plan.primary.as_deref().unwrap_or(names::SYSLOG)
    }

    /// Flushes every sink once all records queued before this call are written.
    /// Blocks until done; returns false when the facility is not running.
    pub fn flush(&self) -> bool {
        let (pool, sinks) = match &*self.lifecycle.read().unwrap_or_else(PoisonError::into_inner) {
            Lifecycle::Initialized(runtime) => (Arc::clone(&runtime.pool), Arc::clone(&runtime.sinks)),
            Lifecycle::Uninitialized | Lifecycle::ShutDown => return false,
        };

        let (done, ack) = mpsc::sync_channel(1);
        if !pool.submit(Message::Flush {
            sinks,
            done: Some(done),
        }) {
            return false;
        }
        ack.recv().is_ok()
    }
}

impl Drop for Facility {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Facility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Facility")
            .field("state", &self.state())
            .field("channels", &self.channel_names())
            .finish_non_exhaustive()
    }
}
