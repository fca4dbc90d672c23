//! Merge rules: defaults, override order, conflict handling.
//!
//! Later sources override earlier ones key by key; lists replace rather than
//! append.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("archive.archive_depth", 2_i64)?
        .set_default("archive.checksum_file_name", "checksum.txt")?
        .set_default("archive.follow_symlinks", false)?
        .set_default("codec.media_preset", 0_i64)?
        .set_default("codec.default_preset", 7_i64)?
        .set_default("codec.encrypt", true)
}
