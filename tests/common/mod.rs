//! Sinks shared by the integration tests.

#![allow(dead_code)]

use chanlog::{Error, LogRecord, Sink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Blocks every write until [`open`](GateSink::open) is called.
#[derive(Default)]
pub struct GateSink {
    open: Mutex<bool>,
    cond: Condvar,
    lines: Mutex<Vec<String>>,
    entered: AtomicUsize,
}

impl GateSink {
    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cond.notify_all();
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Writes that have started, finished or not.
    pub fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }
}

impl Sink for GateSink {
    fn name(&self) -> &str {
        "gate"
    }

    fn write(&self, record: &LogRecord) -> Result<(), Error> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cond.wait(open).unwrap();
        }
        drop(open);
        self.lines.lock().unwrap().push(record.message.clone());
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Fails every write.
pub struct BrokenSink;

impl Sink for BrokenSink {
    fn name(&self) -> &str {
        "broken"
    }

    fn write(&self, _record: &LogRecord) -> Result<(), Error> {
        Err(Error::Io(std::io::Error::other("disk full")))
    }

    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Panics on every write.
pub struct PanickingSink;

impl Sink for PanickingSink {
    fn name(&self) -> &str {
        "panicking"
    }

    fn write(&self, _record: &LogRecord) -> Result<(), Error> {
        panic!("sink exploded");
    }

    fn flush(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// Keeps every message but panics whenever it is flushed.
#[derive(Default)]
pub struct FlushPanicSink {
    lines: Mutex<Vec<String>>,
}

impl FlushPanicSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl Sink for FlushPanicSink {
    fn name(&self) -> &str {
        "flush-panic"
    }

    fn write(&self, record: &LogRecord) -> Result<(), Error> {
        self.lines.lock().unwrap().push(record.message.clone());
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        panic!("flush exploded");
    }
}

/// Counts flushes.
#[derive(Default)]
pub struct FlushCounter {
    pub flushes: AtomicUsize,
}

impl Sink for FlushCounter {
    fn name(&self) -> &str {
        "flush-counter"
    }

    fn write(&self, _record: &LogRecord) -> Result<(), Error> {
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Polls `cond` until it holds or five seconds pass.
pub fn wait_for(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}
