//! TOML configuration loading and `source = "..."` include resolution.
//!
//! Loading (file I/O, cycle detection, merging) lives here; the serde schema is
//! in `structs`. Turning a config into a running facility is
//! [`Facility::from_config`](crate::Facility::from_config).

mod structs;

pub use structs::{ChannelConfig, GeneralConfig, SinkConfig, SinkKind, default_level};

use crate::Error;
use crate::internal;
use crate::level::Level;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the platform config dir holding `chanlog.toml`.
pub const CONFIG_DIR: &str = "chanlog";
pub const CONFIG_FILE: &str = "chanlog.toml";

/// An empty file yields the full server layout: every field has a default.
///
/// Declaring any `[sinks.*]` table, in the file or any file it includes,
/// replaces the default sink set. The same holds for `[channels.*]`.
#[derive(Debug, Clone)]
pub struct Config {
    pub general: GeneralConfig,
    pub sinks: BTreeMap<String, SinkConfig>,
    pub channels: BTreeMap<String, ChannelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            sinks: structs::default_sinks()
                .into_iter()
                .map(|(name, sink)| (name.to_string(), sink))
                .collect(),
            channels: structs::default_channels()
                .into_iter()
                .map(|(name, channel)| (name.to_string(), channel))
                .collect(),
        }
    }
}

/// One file as written, before defaults are filled in. `None` means the file
/// did not declare that table at all.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Layer {
    general: Option<GeneralConfig>,
    sinks: Option<BTreeMap<String, SinkConfig>>,
    channels: Option<BTreeMap<String, ChannelConfig>>,
}

impl Layer {
    /// Adds what `self` leaves out from `other`. `self` wins per sink, per
    /// channel and for the whole `[general]` table.
    fn merge(&mut self, other: Self) {
        if self.general.is_none() {
            self.general = other.general;
        }
        merge_tables(&mut self.sinks, other.sinks);
        merge_tables(&mut self.channels, other.channels);
    }

    fn into_config(self) -> Config {
        let defaults = Config::default();
        Config {
            general: self.general.unwrap_or(defaults.general),
            sinks: self.sinks.unwrap_or(defaults.sinks),
            channels: self.channels.unwrap_or(defaults.channels),
        }
    }
}

fn merge_tables<T>(ours: &mut Option<BTreeMap<String, T>>, theirs: Option<BTreeMap<String, T>>) {
    let Some(theirs) = theirs else {
        return;
    };
    match ours {
        Some(ours) => {
            for (name, value) in theirs {
                ours.entry(name).or_insert(value);
            }
        }
        None => *ours = Some(theirs),
    }
}

/// Splits `source = "..."` lines out of raw TOML before deserialization.
/// Returns the include paths and the remaining TOML.
#[doc(hidden)]
#[must_use]
pub fn extract_sources(content: &str) -> (Vec<String>, String) {
    let mut sources = Vec::new();
    let mut remaining = String::new();

    for line in content.lines() {
        let trimmed = line.trim();
        let include = trimmed
            .strip_prefix("source")
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('='));
        match include {
            Some(value) => {
                let path = value.trim().trim_matches('"').trim_matches('\'');
                if !path.is_empty() {
                    sources.push(path.to_string());
                }
            }
            None => {
                remaining.push_str(line);
                remaining.push('\n');
            }
        }
    }

    (sources, remaining)
}

impl Config {
    /// Loads `<config_dir>/chanlog/chanlog.toml`, or the defaults when it does not exist.
    ///
    /// # Errors
    /// Fails if the config directory can't be determined, a file can't be read,
    /// TOML parsing hits a syntax error or includes form a cycle.
    pub fn load() -> Result<Self, Error> {
        let config_path = Self::get_config_path()?;
        let config = Self::load_from(&config_path)?;
        internal::debug(
            "CONFIG",
            &format!("Config loaded from {}", config_path.display()),
        );
        Ok(config)
    }

    /// Loads configuration from an explicit path. A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, parsed, or contains cyclic includes.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            internal::debug(
                "CONFIG",
                &format!("{} not found, using defaults", path.display()),
            );
            return Ok(Self::default());
        }
        Ok(Self::load_with_sources(path, &mut HashSet::new())?.into_config())
    }

    /// Parses TOML text with no include resolution.
    ///
    /// # Errors
    /// TOML syntax or type errors.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let (sources, toml_content) = extract_sources(content);
        if !sources.is_empty() {
            internal::warn("CONFIG", "source lines ignored when parsing from a string");
        }
        Ok(toml::from_str::<Layer>(&toml_content)?.into_config())
    }

    fn load_with_sources(path: &Path, seen: &mut HashSet<PathBuf>) -> Result<Layer, Error> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !seen.insert(canonical.clone()) {
            internal::warn(
                "CONFIG",
                &format!("Cyclic include detected: {}", canonical.display()),
            );
            return Err(Error::CyclicInclude(canonical));
        }

        let content = fs::read_to_string(path)?;
        let (sources, toml_content) = extract_sources(&content);
        let mut layer: Layer = toml::from_str(&toml_content)?;

        for source in sources {
            let expanded = shellexpand::tilde(&source);
            let mut source_file = PathBuf::from(expanded.into_owned());
            // Relative includes are relative to the including file
            if source_file.is_relative() {
                if let Some(parent) = path.parent() {
                    source_file = parent.join(source_file);
                }
            }

            if source_file.exists() {
                internal::debug("CONFIG", &format!("Processing source: {source}"));
                let included = Self::load_with_sources(&source_file, seen)?;
                layer.merge(included);
            } else {
                internal::warn("CONFIG", &format!("Source file not found: {source}"));
            }
        }

        Ok(layer)
    }

    /// `<config_dir>/chanlog/chanlog.toml`, whether or not it exists.
    ///
    /// # Errors
    /// Fails when the platform has no concept of a config directory.
    pub fn get_config_path() -> Result<PathBuf, Error> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join(CONFIG_DIR).join(CONFIG_FILE))
            .ok_or(Error::ConfigDirNotFound)
    }

    /// `general.base_dir` with `~` and environment variables expanded.
    #[must_use]
    pub fn base_dir(&self) -> PathBuf {
        expand_path(&self.general.base_dir)
    }

    /// Resolves a sink path against [`base_dir`](Self::base_dir).
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        self.base_dir().join(expand_path(path))
    }

    /// Minimum level of `channel`, if declared.
    ///
    /// # Errors
    /// The configured string is not a level name.
    pub fn channel_level(&self, channel: &str) -> Result<Option<Level>, Error> {
        self.channels
            .get(channel)
            .map(|c| parse_level(&c.level))
            .transpose()
    }
}

/// Parses a level name from config, accepting the same aliases as [`Level`]'s `FromStr`.
///
/// # Errors
/// `Error::InvalidLevel` for unknown names.
pub fn parse_level(level: &str) -> Result<Level, Error> {
    Ok(level.parse::<Level>()?)
}

fn expand_path(path: &str) -> PathBuf {
    // Unknown variables leave the path untouched rather than failing the load
    let expanded = shellexpand::full(path).map_or_else(|_| shellexpand::tilde(path), |p| p);
    PathBuf::from(expanded.into_owned())
}
