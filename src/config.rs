//! Tracker configuration (`tracked.toml`).
//!
//! Defines the typed configuration for surface synthesis and event log
//! sizing. Every field has a default, so an empty file and a missing file
//! both yield [`TrackerConfig::default`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level tracker configuration.
///
/// ```toml
/// [surface]
/// deny = ["reset"]
///
/// [log]
/// initial_capacity = 64
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Surface synthesis settings.
    #[serde(default)]
    pub surface: SurfaceConfig,

    /// Event log settings.
    #[serde(default)]
    pub log: LogConfig,
}

// ---------------------------------------------------------------------------
// SurfaceConfig
// ---------------------------------------------------------------------------

/// Surface synthesis settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SurfaceConfig {
    /// Operation names never forwarded, on top of the built-in construction
    /// hooks (`new`, `default`, `from`, `with_capacity`).
    #[serde(default)]
    pub deny: Vec<String>,
}

// ---------------------------------------------------------------------------
// LogConfig
// ---------------------------------------------------------------------------

/// Event log settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Events preallocated by each new log (default: 64).
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
        }
    }
}

const fn default_initial_capacity() -> usize {
    64
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error loading or parsing a tracker config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("cannot read `{}`: {source}", .path.display())]
    Unreadable {
        /// The file that was being loaded.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The contents are not valid TOML or do not match the schema.
    #[error("{}{message}", location(.path, .line))]
    Invalid {
        /// The file the contents came from, when loaded from disk.
        path: Option<PathBuf>,
        /// 1-based line of the offending token, when toml reports a span.
        line: Option<usize>,
        /// The parser's message.
        message: String,
    },
}

impl ConfigError {
    /// The file involved, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Unreadable { path, .. } => Some(path),
            Self::Invalid { path, .. } => path.as_deref(),
        }
    }

    /// The offending line, for parse failures that carry a span.
    #[must_use]
    pub const fn line(&self) -> Option<usize> {
        match self {
            Self::Unreadable { .. } => None,
            Self::Invalid { line, .. } => *line,
        }
    }

    fn from_toml(source: &str, err: &toml::de::Error) -> Self {
        let line = err
            .span()
            .map(|span| source[..span.start].matches('\n').count() + 1);
        Self::Invalid {
            path: None,
            line,
            message: err.message().to_owned(),
        }
    }

    fn at(self, file: &Path) -> Self {
        match self {
            Self::Invalid { line, message, .. } => Self::Invalid {
                path: Some(file.to_owned()),
                line,
                message,
            },
            unreadable @ Self::Unreadable { .. } => unreadable,
        }
    }
}

#[allow(clippy::ref_option)]
fn location(path: &Option<PathBuf>, line: &Option<usize>) -> String {
    match (path, line) {
        (Some(path), Some(line)) => format!("{}:{line}: ", path.display()),
        (Some(path), None) => format!("{}: ", path.display()),
        (None, Some(line)) => format!("line {line}: "),
        (None, None) => String::new(),
    }
}

impl TrackerConfig {
    /// Load configuration from a TOML file. A missing file yields the
    /// defaults.
    ///
    /// # Errors
    /// [`ConfigError::Unreadable`] for I/O failures other than not-found,
    /// [`ConfigError::Invalid`] for malformed contents.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).map_err(|err| err.at(path)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no tracker config; using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Unreadable {
                path: path.to_owned(),
                source,
            }),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] on malformed TOML or unknown fields.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|err| ConfigError::from_toml(contents, &err))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
