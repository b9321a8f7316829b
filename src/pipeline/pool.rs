//! Shared worker pool: one bounded queue, a fixed set of worker threads.
//!
//! Every pipeline submits into the same queue, so sinks shared between channels
//! are written from a single place. Producers block on a full queue; that is the
//! backpressure policy, nothing is ever dropped.

use super::Pipeline;
use crate::Error;
use crate::internal;
use crate::record::LogRecord;
use crate::sink::Sink;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

/// Default queue capacity in records.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 14;

/// Default worker count. One worker keeps per-channel FIFO strict.
pub const DEFAULT_WORKER_THREADS: usize = 1;

pub(crate) enum Message {
    Record(Arc<Pipeline>, LogRecord),
    /// Flushes every listed sink once all earlier messages are processed.
    /// `done` is signalled afterwards when a caller waits for it.
    Flush {
        sinks: Arc<[Arc<dyn Sink>]>,
        done: Option<SyncSender<()>>,
    },
}

/// Bounded queue plus the workers draining it.
pub struct WorkerPool {
    /// `None` once closed. Producers hold the read side while they block on a
    /// full queue, so `close` cannot slip in between a check and a send.
    sender: RwLock<Option<SyncSender<Message>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    capacity: usize,
}

impl WorkerPool {
    /// Starts `threads` workers behind a queue holding `capacity` records.
    ///
    /// # Errors
    /// Zero capacity or zero threads are rejected; spawn failures surface as I/O errors.
    pub fn start(capacity: usize, threads: usize) -> Result<Arc<Self>, Error> {
        if capacity == 0 {
            return Err(Error::InvalidConfig("queue capacity must be > 0".to_string()));
        }
        if threads == 0 {
            return Err(Error::InvalidConfig("worker threads must be > 0".to_string()));
        }

        let (tx, rx) = mpsc::sync_channel::<Message>(capacity);
        let rx = Arc::new(Mutex::new(rx));
        let mut workers = Vec::with_capacity(threads);

        for id in 0..threads {
            let rx = Arc::clone(&rx);
            let handle = thread::Builder::new()
                .name(format!("chanlog-worker-{id}"))
                .spawn(move || worker_loop(&rx))?;
            workers.push(handle);
        }

        internal::debug(
            "POOL",
            &format!("Started {threads} worker(s), queue capacity {capacity}"),
        );

        Ok(Arc::new(Self {
            sender: RwLock::new(Some(tx)),
            workers: Mutex::new(workers),
            capacity,
        }))
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers
            .lock()
            .map_or(0, |w| w.len())
    }

    /// True until [`close`](Self::close) has begun.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Enqueues `msg`, blocking while the queue is full.
    /// Returns false when the pool is closed; the message is discarded unseen.
    pub(crate) fn submit(&self, msg: Message) -> bool {
        let sender = self.sender.read().unwrap_or_else(PoisonError::into_inner);
        sender.as_ref().is_some_and(|tx| tx.send(msg).is_ok())
    }

    /// Stops accepting, waits for workers to drain everything already queued,
    /// then joins them. Safe to call more than once.
    pub fn close(&self) {
        let sender = self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if sender.is_none() {
            return;
        }
        // Dropping the last sender lets recv() return Err once the queue is empty
        drop(sender);

        let workers = std::mem::take(
            &mut *self.workers.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for handle in workers {
            if handle.join().is_err() {
                internal::error("POOL", "Worker thread panicked during drain");
            }
        }
        internal::debug("POOL", "Workers drained and joined");
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("capacity", &self.capacity)
            .field("workers", &self.worker_count())
            .field("open", &self.is_open())
            .finish()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

fn worker_loop(rx: &Mutex<Receiver<Message>>) {
    loop {
        let msg = {
            let rx = rx.lock().unwrap_or_else(PoisonError::into_inner);
            rx.recv()
        };
        match msg {
            Ok(Message::Record(pipeline, record)) => pipeline.deliver(&record),
            Ok(Message::Flush { sinks, done }) => {
                for sink in sinks.iter() {
                    if let Err(reason) = super::flush_sink(sink.as_ref()) {
                        internal::warn("POOL", &format!("Flush of '{}' failed: {reason}", sink.name()));
                    }
                }
                if let Some(done) = done {
                    let _ = done.send(());
                }
            }
            Err(_) => break,
        }
    }
}
