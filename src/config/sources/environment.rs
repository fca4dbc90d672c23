//! Environment source: `DIRVAULT__SECTION__KEY=value`

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::Environment;

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "DIRVAULT";

/// Add environment overrides (highest precedence).
pub fn add_to_builder(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    )
}
