//! Background thread that queues a flush of every sink once per interval.
//!
//! The flush travels through the worker queue like any record, so it never
//! races a worker that is mid-write on the same sink.

use crate::Error;
use crate::internal;
use crate::pipeline::{Message, WorkerPool};
use crate::sink::Sink;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

pub(super) struct Flusher {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

impl Flusher {
    pub(super) fn spawn(
        interval: Duration,
        pool: Arc<WorkerPool>,
        sinks: Arc<[Arc<dyn Sink>]>,
    ) -> Result<Self, Error> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("chanlog-flush".to_string())
            .spawn(move || {
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let flush = Message::Flush {
                                sinks: Arc::clone(&sinks),
                                done: None,
                            };
                            if !pool.submit(flush) {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                internal::trace("FLUSH", "Flusher exited");
            })?;

        internal::debug("FLUSH", &format!("Flushing every {interval:?}"));
        Ok(Self { stop, handle })
    }

    /// Signals the thread and waits for it. A flush already queued still runs.
    pub(super) fn stop(self) {
        let _ = self.stop.send(());
        if self.handle.join().is_err() {
            internal::error("FLUSH", "Flusher thread panicked");
        }
    }
}
