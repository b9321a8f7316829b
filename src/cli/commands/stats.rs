//! Stats command implementation.

use crate::config::{Config, SinkKind};
use crate::sink::format_size;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Size of one file written by the layout.
#[derive(Debug, Clone)]
pub struct LogFileInfo {
    pub sink: String,
    pub path: PathBuf,
    pub size: u64,
}

/// Every existing file for `config`'s file sinks, rotated backups included.
#[must_use]
pub fn collect(config: &Config) -> Vec<LogFileInfo> {
    let mut files = Vec::new();
    for (name, sink) in &config.sinks {
        let Some(path) = sink.path.as_deref().map(|p| config.resolve_path(p)) else {
            continue;
        };
        push_if_exists(&mut files, name, path.clone());

        if sink.kind == SinkKind::Rotating {
            for index in 1..=sink.max_files {
                let mut backup = path.as_os_str().to_owned();
                backup.push(format!(".{index}"));
                push_if_exists(&mut files, name, PathBuf::from(backup.clone()));
                backup.push(".gz");
                push_if_exists(&mut files, name, PathBuf::from(backup));
            }
        }
    }
    files
}

fn push_if_exists(files: &mut Vec<LogFileInfo>, sink: &str, path: PathBuf) {
    if let Ok(meta) = fs::metadata(&path) {
        files.push(LogFileInfo {
            sink: sink.to_string(),
            path,
            size: meta.len(),
        });
    }
}

/// Handles `chanlog stats`.
#[must_use]
pub fn cmd_stats(config: &Config) -> ExitCode {
    let files = collect(config);
    let total: u64 = files.iter().map(|f| f.size).sum();

    println!("Base dir:    {}", config.base_dir().display());
    println!("Total files: {}", files.len());
    println!("Total size:  {}", format_size(total));
    for file in &files {
        println!(
            "  {:<10} {} ({})",
            file.sink,
            display_relative(&file.path, &config.base_dir()),
            format_size(file.size)
        );
    }
    ExitCode::SUCCESS
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn collects_files_and_backups() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("log.txt"), "abc").unwrap();
        fs::write(tmp.path().join("syslog.txt"), "").unwrap();
        fs::write(tmp.path().join("syslog.txt.1"), "12345").unwrap();
        fs::write(tmp.path().join("syslog.txt.2.gz"), "1").unwrap();

        let config = Config::parse(&format!(
            "[general]\nbase_dir = \"{}\"\n",
            tmp.path().display()
        ))
        .unwrap();
        let files = collect(&config);

        let total: u64 = files.iter().map(|f| f.size).sum();
        assert_eq!(files.len(), 4);
        assert_eq!(total, 9);
        assert!(files.iter().any(|f| f.sink == "syslog" && f.path.ends_with("syslog.txt.2.gz")));
    }
}
