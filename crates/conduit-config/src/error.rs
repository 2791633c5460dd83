//! Error types for configuration operations.

use conduit_routing::RoutingError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// File system step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// Reading a configuration file.
    Read,
    /// Writing a configuration file.
    Write,
    /// Creating a configuration directory.
    CreateDir,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileAction::Read => "read",
            FileAction::Write => "write",
            FileAction::CreateDir => "create directory",
        })
    }
}

/// Errors raised while loading, saving or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system operation failed.
    #[error("failed to {action} '{path}': {source}")]
    Io {
        /// What was being attempted.
        action: FileAction,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The configuration parsed but is inconsistent.
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),

    /// Building the routing table from a valid configuration failed.
    #[error("routing: {0}")]
    Routing(#[from] RoutingError),
}

impl ConfigError {
    pub(crate) fn io(action: FileAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// POSIX-style negative error code: the OS code for I/O failures
    /// (`-EIO` when there is none), `-EINVAL` for content problems.
    pub fn errno(&self) -> i32 {
        match self {
            ConfigError::Io { source, .. } => source.raw_os_error().map_or(-libc::EIO, |code| -code),
            ConfigError::Routing(e) => e.errno(),
            ConfigError::TomlParse(_)
            | ConfigError::TomlSerialize(_)
            | ConfigError::Validation(_) => -libc::EINVAL,
        }
    }
}
