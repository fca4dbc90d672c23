//! Configuration System
//!
//! Layered configuration for archive passes: built-in defaults, the user's
//! global config file, an explicit `--config` file, then `DIRVAULT__*`
//! environment variables. The loaded [`DirvaultConfig`] plus the operator's
//! roots are resolved into a [`RunSettings`] value handed to the engine.

use crate::codec::FilterPolicy;
use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use crate::tree::path;
use crate::tree::walker::WalkerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirvaultConfig {
    /// Traversal and artifact settings
    #[serde(default)]
    pub archive: ArchiveSettings,

    /// Compression and encryption settings
    #[serde(default)]
    pub codec: CodecSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Traversal and artifact settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSettings {
    /// Depth at which whole subtrees are archived (root = 0)
    #[serde(default = "default_archive_depth")]
    pub archive_depth: usize,

    /// File name of the checksum artifact kept in each archived directory
    #[serde(default = "default_checksum_file_name")]
    pub checksum_file_name: String,

    /// Follow symbolic links while walking (default: false)
    #[serde(default)]
    pub follow_symlinks: bool,
}

fn default_archive_depth() -> usize {
    2
}

fn default_checksum_file_name() -> String {
    "checksum.txt".to_string()
}

impl Default for ArchiveSettings {
    fn default() -> Self {
        Self {
            archive_depth: default_archive_depth(),
            checksum_file_name: default_checksum_file_name(),
            follow_symlinks: false,
        }
    }
}

/// Compression and encryption settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecSettings {
    /// Path components marking already-compressed media
    #[serde(default = "default_media_markers")]
    pub media_markers: Vec<String>,

    /// LZMA2 preset for media directories
    #[serde(default)]
    pub media_preset: u32,

    /// LZMA2 preset for everything else
    #[serde(default = "default_preset")]
    pub default_preset: u32,

    /// Encrypt archives with the pass password
    #[serde(default = "default_true")]
    pub encrypt: bool,
}

fn default_media_markers() -> Vec<String> {
    FilterPolicy::default().media_markers
}

fn default_preset() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            media_markers: default_media_markers(),
            media_preset: 0,
            default_preset: default_preset(),
            encrypt: default_true(),
        }
    }
}

impl CodecSettings {
    pub fn filter_policy(&self) -> FilterPolicy {
        FilterPolicy {
            media_markers: self.media_markers.clone(),
            media_preset: self.media_preset,
            default_preset: self.default_preset,
            encrypt: self.encrypt,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Archive(String),
    Codec(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Archive(msg) => write!(f, "archive: {}", msg),
            ValidationError::Codec(msg) => write!(f, "codec: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl DirvaultConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = &self.archive.checksum_file_name;
        if name.trim().is_empty() {
            errors.push(ValidationError::Archive(
                "checksum_file_name cannot be empty".to_string(),
            ));
        } else if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            errors.push(ValidationError::Archive(format!(
                "checksum_file_name '{}' must be a plain file name",
                name
            )));
        }

        for (field, preset) in [
            ("media_preset", self.codec.media_preset),
            ("default_preset", self.codec.default_preset),
        ] {
            if preset > 9 {
                errors.push(ValidationError::Codec(format!(
                    "{} must be between 0 and 9, got {}",
                    field, preset
                )));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding all errors into one [`ConfigError`]
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        self.validate().map_err(|errors| {
            let msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ConfigError::Invalid(msgs.join("; "))
        })
    }
}

/// Fully resolved settings for one pass
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Canonical source root
    pub source_root: PathBuf,
    /// Absolute destination root (may not exist yet)
    pub destination_root: PathBuf,
    pub archive_depth: usize,
    pub checksum_file_name: String,
    pub follow_symlinks: bool,
    pub filter_policy: FilterPolicy,
    /// Compute decisions without writing anything
    pub dry_run: bool,
}

impl RunSettings {
    /// Resolve operator input against the loaded configuration
    ///
    /// Fails without touching the filesystem when the source root is not a
    /// readable directory, when the destination would live inside the source
    /// tree, or when the configuration itself is invalid.
    pub fn resolve(
        source_root: &Path,
        destination_root: &Path,
        config: &DirvaultConfig,
        archive_depth: Option<usize>,
        dry_run: bool,
    ) -> Result<Self, ConfigError> {
        config.ensure_valid()?;

        let source_root = resolve_source(source_root)?;

        let destination_root = resolve_destination(destination_root)?;
        if path::is_within(&source_root, &destination_root) {
            return Err(ConfigError::DestinationInsideSource {
                destination: destination_root,
                source_root,
            });
        }

        Ok(Self {
            source_root,
            destination_root,
            archive_depth: archive_depth.unwrap_or(config.archive.archive_depth),
            checksum_file_name: config.archive.checksum_file_name.clone(),
            follow_symlinks: config.archive.follow_symlinks,
            filter_policy: config.codec.filter_policy(),
            dry_run,
        })
    }

    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            excluded_file_name: self.checksum_file_name.clone(),
        }
    }
}

/// Canonical source root, which must be a readable directory
pub fn resolve_source(source_root: &Path) -> Result<PathBuf, ConfigError> {
    let canonical = path::canonicalize_path(source_root)
        .map_err(|_| ConfigError::UnreadableSource(source_root.to_path_buf()))?;
    if !canonical.is_dir() || std::fs::read_dir(&canonical).is_err() {
        return Err(ConfigError::UnreadableSource(canonical));
    }
    Ok(canonical)
}

/// Canonicalize the deepest existing ancestor and re-append the rest
fn resolve_destination(destination: &Path) -> Result<PathBuf, ConfigError> {
    let absolute = if destination.is_absolute() {
        destination.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| ConfigError::Invalid(format!("cannot resolve working directory: {}", e)))?
            .join(destination)
    };

    let mut existing = absolute.as_path();
    let mut remainder = Vec::new();
    while !existing.exists() {
        let name = existing.file_name().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "destination {} has no existing ancestor",
                absolute.display()
            ))
        })?;
        remainder.push(name.to_os_string());
        existing = existing.parent().ok_or_else(|| {
            ConfigError::Invalid(format!(
                "destination {} has no existing ancestor",
                absolute.display()
            ))
        })?;
    }

    let mut resolved = path::canonicalize_path(existing)
        .map_err(|e| ConfigError::Invalid(format!("destination: {}", e)))?;
    for name in remainder.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}
