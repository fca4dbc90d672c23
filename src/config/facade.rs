//! Config loading facade: assembles sources in precedence order.

use super::merge::merge_policy;
use super::sources::{environment, explicit_file, global_file};
use super::DirvaultConfig;
use crate::error::ConfigError;
use std::path::Path;
use tracing::debug;

/// Loads [`DirvaultConfig`] from layered sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    ///
    /// Precedence (highest last): defaults, global file, `config_path`,
    /// `DIRVAULT__*` environment variables.
    pub fn load(config_path: Option<&Path>) -> Result<DirvaultConfig, ConfigError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = config_path {
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = environment::add_to_builder(builder);

        let config: DirvaultConfig = builder.build()?.try_deserialize()?;
        debug!(
            archive_depth = config.archive.archive_depth,
            checksum_file = %config.archive.checksum_file_name,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load only the given file on top of defaults (no global file, no env)
    pub fn load_from_file(config_path: &Path) -> Result<DirvaultConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = explicit_file::add_to_builder(builder, config_path)?;
        Ok(builder.build()?.try_deserialize()?)
    }
}
