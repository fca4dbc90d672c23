//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{BackupError, ConfigError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &BackupError) -> String {
    match e {
        BackupError::Config(ConfigError::DestinationInsideSource { .. }) => format!(
            "{}\nChoose a destination outside the source tree so archives are not archived again.",
            e
        ),
        BackupError::Config(ConfigError::Load(_)) => {
            format!("{}\nCheck the --config file and DIRVAULT__* environment variables.", e)
        }
        _ => e.to_string(),
    }
}
