//! The legacy general-purpose log keeps growing for the lifetime of a server, so
//! it rotates. Rotation shifts numbered backups the classic way:
//! `syslog.txt` -> `syslog.txt.1` -> `syslog.txt.2` ... and drops the oldest
//! once `max_files` backups exist.

use super::compress::compress_file;
use super::file::open_log_file;
use super::{Sink, lock};
use crate::Error;
use crate::fmt::Pattern;
use crate::internal;
use crate::record::LogRecord;
use chrono::{DateTime, Local, NaiveDate};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// When to rotate and how many backups to keep. All triggers default to off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Rotate before a write would push the file past this many bytes.
    pub max_size: Option<u64>,
    /// Rotate on the first write after local midnight.
    pub daily: bool,
    /// Number of numbered backups kept; `0` discards the old file on rotation.
    pub max_files: usize,
    /// Gzip backups as they are created.
    pub compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_size: None,
            daily: false,
            max_files: 5,
            compress: false,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub const fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }

    #[must_use]
    pub const fn daily(mut self, daily: bool) -> Self {
        self.daily = daily;
        self
    }

    #[must_use]
    pub const fn max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    #[must_use]
    pub const fn compress(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    fn should_rotate(&self, state: &ActiveFile, incoming: u64, today: NaiveDate) -> bool {
        let over_size = self
            .max_size
            .is_some_and(|max| state.written > 0 && state.written + incoming > max);
        let new_day = self.daily && state.opened_on != today;
        over_size || new_day
    }
}

#[derive(Debug)]
struct ActiveFile {
    file: File,
    written: u64,
    opened_on: NaiveDate,
}

/// Size/day rotating file used for the primary channel.
#[derive(Debug)]
pub struct RotatingFileSink {
    name: String,
    path: PathBuf,
    pattern: Pattern,
    policy: RotationPolicy,
    active: Mutex<ActiveFile>,
}

impl RotatingFileSink {
    /// Opens `path` in append mode; an existing file keeps counting toward `max_size`.
    ///
    /// # Errors
    /// Fails when the file or its parent directory cannot be created.
    pub fn open(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        pattern: Pattern,
        policy: RotationPolicy,
    ) -> Result<Self, Error> {
        let path = path.into();
        let file = open_log_file(&path, false)?;
        let meta = file.metadata()?;

        // A file left over from yesterday must rotate on the first daily check
        let opened_on = meta
            .modified()
            .map_or_else(|_| Local::now().date_naive(), |t| {
                DateTime::<Local>::from(t).date_naive()
            });

        internal::debug(
            "ROTATE",
            &format!("Opened {} ({} bytes)", path.display(), meta.len()),
        );

        Ok(Self {
            name: name.into(),
            path,
            pattern,
            policy,
            active: Mutex::new(ActiveFile {
                file,
                written: meta.len(),
                opened_on,
            }),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Path of backup number `index` (1 is the newest).
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{index}"));
        if self.policy.compress {
            name.push(".gz");
        }
        PathBuf::from(name)
    }

    fn rotate(&self, active: &mut ActiveFile, today: NaiveDate) -> Result<(), Error> {
        active.file.flush()?;
        let max = self.policy.max_files;

        if max == 0 {
            fs::remove_file(&self.path)?;
            self.reopen(active, today)?;
        } else {
            let oldest = self.backup_path(max);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..max).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }

            let mut first = self.path.as_os_str().to_owned();
            first.push(".1");
            let first = PathBuf::from(first);
            fs::rename(&self.path, &first)?;
            // The active file is gone from here on; get a new one before anything else can fail
            self.reopen(active, today)?;

            if self.policy.compress {
                if let Err(e) = compress_file(&first) {
                    internal::warn(
                        "ROTATE",
                        &format!("Could not compress {}, left as is: {e}", first.display()),
                    );
                }
            }
        }

        internal::debug("ROTATE", &format!("Rotated {}", self.path.display()));
        Ok(())
    }

    fn reopen(&self, active: &mut ActiveFile, today: NaiveDate) -> Result<(), Error> {
        active.file = open_log_file(&self.path, true)?;
        active.written = 0;
        active.opened_on = today;
        Ok(())
    }
}

impl Sink for RotatingFileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, record: &LogRecord) -> Result<(), Error> {
        let mut line = self.pattern.render(record);
        line.push('\n');
        let incoming = line.len() as u64;
        let today = record.timestamp.date_naive();

        let mut active = lock(&self.active, &self.name)?;
        if self.policy.should_rotate(&active, incoming, today) {
            self.rotate(&mut active, today)?;
        }

        active.file.write_all(line.as_bytes())?;
        active.written += incoming;
        Ok(())
    }

    fn flush(&self) -> Result<(), Error> {
        lock(&self.active, &self.name)?.file.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use tempfile::TempDir;

    fn record(msg: &str) -> LogRecord {
        LogRecord::new(Level::Info, "syslog".into(), msg.to_string(), None)
    }

    #[test]
    fn rotates_when_size_exceeded() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("syslog.txt");
        let policy = RotationPolicy::default().max_size(10).max_files(2);
        let sink = RotatingFileSink::open("syslog", &path, Pattern::parse("{msg}"), policy).unwrap();

        sink.write(&record("aaaaaaa")).unwrap();
        sink.write(&record("bbbbbbb")).unwrap();
        sink.write(&record("ccccccc")).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ccccccc\n");
        assert_eq!(fs::read_to_string(sink.backup_path(1)).unwrap(), "bbbbbbb\n");
        assert_eq!(fs::read_to_string(sink.backup_path(2)).unwrap(), "aaaaaaa\n");
    }

    #[test]
    fn retention_drops_oldest_backup() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("syslog.txt");
        let policy = RotationPolicy::default().max_size(4).max_files(1);
        let sink = RotatingFileSink::open("syslog", &path, Pattern::parse("{msg}"), policy).unwrap();

        for msg in ["one", "two", "six"] {
            sink.write(&record(msg)).unwrap();
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), "six\n");
        assert_eq!(fs::read_to_string(sink.backup_path(1)).unwrap(), "two\n");
        assert!(!sink.backup_path(2).exists());
    }

    #[test]
    fn oversized_single_record_still_written() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("syslog.txt");
        let policy = RotationPolicy::default().max_size(2);
        let sink = RotatingFileSink::open("syslog", &path, Pattern::parse("{msg}"), policy).unwrap();

        sink.write(&record("much longer than two bytes")).unwrap();
        assert!(!sink.backup_path(1).exists());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "much longer than two bytes\n"
        );
    }

    #[cfg(unix)]
    #[test]
    fn failed_compression_keeps_logging() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("syslog.txt");
        let policy = RotationPolicy::default().max_size(4).max_files(1).compress(true);
        let sink = RotatingFileSink::open("syslog", &path, Pattern::parse("{msg}"), policy).unwrap();
        // A dangling link where the archive should go makes gzip creation fail
        std::os::unix::fs::symlink(tmp.path().join("missing/dir"), sink.backup_path(1)).unwrap();

        sink.write(&record("first")).unwrap();
        sink.write(&record("second")).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        assert_eq!(
            fs::read_to_string(tmp.path().join("syslog.txt.1")).unwrap(),
            "first\n"
        );

        sink.write(&record("third")).unwrap();
        sink.flush().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "third\n");
    }

    #[test]
    fn compressed_backups_get_gz_suffix() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("syslog.txt");
        let policy = RotationPolicy::default().max_size(4).compress(true);
        let sink = RotatingFileSink::open("syslog", &path, Pattern::parse("{msg}"), policy).unwrap();

        sink.write(&record("first")).unwrap();
        sink.write(&record("second")).unwrap();

        let backup = sink.backup_path(1);
        assert!(backup.to_string_lossy().ends_with(".1.gz"));
        assert!(backup.exists());
    }
}
