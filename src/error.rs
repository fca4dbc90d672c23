//! Error types for the dirvault archival engine.

use std::path::PathBuf;
use thiserror::Error;

/// Filesystem-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk directory: {0}")]
    Walk(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

impl StorageError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Write {
            path: path.into(),
            source,
        }
    }
}

impl From<walkdir::Error> for StorageError {
    fn from(err: walkdir::Error) -> Self {
        StorageError::Walk(err.to_string())
    }
}

/// Archive codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Archive creation failed for {path}: {message}")]
    Archive { path: PathBuf, message: String },

    #[error("Archive entry {name} could not be added: {message}")]
    Entry { name: String, message: String },

    #[error("Archive password must not be empty")]
    EmptyPassword,

    #[error("Codec I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors. Always fatal, raised before any mutation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Source root {0} is not a readable directory")]
    UnreadableSource(PathBuf),

    #[error("Destination root {destination} must not be inside source root {source_root}")]
    DestinationInsideSource {
        destination: PathBuf,
        source_root: PathBuf,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Top-level error for a backup pass
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Password prompt failed: {0}")]
    Prompt(String),

    #[error("Failed to render output: {0}")]
    Render(#[from] serde_json::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}
