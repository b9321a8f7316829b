//! Sinks are the durable end of a channel. One sink may be bound to several
//! channels (the combined file), so every implementation serializes its own
//! writes and takes `&self`.

mod compress;
mod console;
mod file;
mod memory;
mod rotating;
mod size;

pub use console::{ConsoleSink, Stream};
pub use file::FileSink;
pub use memory::MemorySink;
pub use rotating::{RotatingFileSink, RotationPolicy};
pub use size::{format_size, parse_size};

use crate::Error;
use crate::record::LogRecord;
use std::sync::{Mutex, MutexGuard};

/// A single write destination for finished records.
///
/// `Send + Sync` because sinks are shared between the facility, the worker
/// threads and the periodic flusher.
pub trait Sink: Send + Sync {
    /// Name used in diagnostics and pipeline statistics.
    fn name(&self) -> &str;

    /// Renders `record` with the sink's pattern and hands the line to the OS
    /// before returning.
    ///
    /// # Errors
    /// I/O errors from the destination. The pipeline counts them; they never
    /// reach the producer that emitted the record.
    fn write(&self, record: &LogRecord) -> Result<(), Error>;

    /// Pushes anything buffered in user space out to the OS.
    ///
    /// # Errors
    /// I/O errors from the destination.
    fn flush(&self) -> Result<(), Error>;
}

/// Poisoning only happens if a previous write panicked mid-way; report it instead of propagating the panic.
pub(crate) fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, Error> {
    mutex.lock().map_err(|_| Error::Poisoned(name.to_string()))
}
