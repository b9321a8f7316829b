//! Plain append-only file, the building block for the combined, error, packet
//! and instance logs.

use super::{Sink, lock};
use crate::Error;
use crate::fmt::Pattern;
use crate::internal;
use crate::record::LogRecord;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Single file destination. Writes go straight to the file descriptor, so a
/// returned `write` means the OS has the bytes.
#[derive(Debug)]
pub struct FileSink {
    name: String,
    path: PathBuf,
    pattern: Pattern,
    file: Mutex<File>,
}

impl FileSink {
    /// Opens (and creates) `path`. With `truncate` the previous run's content is
    /// discarded, otherwise new records are appended.
    ///
    /// # Errors
    /// Fails when the parent directory cannot be created or the file cannot be opened.
    pub fn open(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        pattern: Pattern,
        truncate: bool,
    ) -> Result<Self, Error> {
        let path = path.into();
        let file = open_log_file(&path, truncate)?;
        internal::debug("FILE", &format!("Opened {}", path.display()));

        Ok(Self {
            name: name.into(),
            path,
            pattern,
            file: Mutex::new(file),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(super) fn open_log_file(path: &Path, truncate: bool) -> Result<File, Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
            internal::debug("FILE", &format!("Created directory: {}", parent.display()));
        }
    }

    let mut options = OpenOptions::new();
    options.create(true);
    if truncate {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    Ok(options.open(path)?)
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), Error> {
        let mut line = self.pattern.render(record);
        line.push('\n');

        let mut file = lock(&self.file, &self.name)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        lock(&self.file, &self.name)?.flush()?;
        Ok(())
    }
}
