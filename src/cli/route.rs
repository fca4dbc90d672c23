//! CLI route: run context and command dispatch.

use crate::cli::parse::{Commands, OutputFormat};
use crate::cli::presentation::{format_pass_report, format_plan};
use crate::codec::SevenZCodec;
use crate::config::{self, ConfigLoader, DirvaultConfig, RunSettings};
use crate::engine::{plan_partition, ArchivePass};
use crate::error::BackupError;
use crate::types::Password;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::info;

/// Exit status when the pass finished but some directories failed
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Rendered command result and the process exit code it implies
#[derive(Debug)]
pub struct CommandOutput {
    pub text: String,
    pub exit_code: i32,
}

/// Runtime context for CLI execution: loaded configuration and output options
pub struct RunContext {
    config: DirvaultConfig,
    color: bool,
}

impl RunContext {
    /// Load configuration (global file, optional explicit file, env overrides)
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, BackupError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        config.ensure_valid()?;
        Ok(Self {
            config,
            color: std::io::stdout().is_terminal(),
        })
    }

    /// Build from an already loaded configuration
    pub fn from_config(config: DirvaultConfig) -> Self {
        Self {
            config,
            color: false,
        }
    }

    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, BackupError> {
        match command {
            Commands::Run {
                source,
                destination,
                depth,
                password,
                dry_run,
                format,
            } => {
                let settings =
                    RunSettings::resolve(source, destination, &self.config, *depth, *dry_run)?;
                let password = self.resolve_password(password.as_deref(), *dry_run)?;
                self.handle_run(settings, password, *format)
            }
            Commands::Plan {
                source,
                depth,
                format,
            } => self.handle_plan(source, *depth, *format),
        }
    }

    fn handle_run(
        &self,
        settings: RunSettings,
        password: Password,
        format: OutputFormat,
    ) -> Result<CommandOutput, BackupError> {
        let codec = SevenZCodec;
        let pass = ArchivePass::new(settings, &codec, password);
        let report = pass.run();

        let text = format_pass_report(&report, format, self.color)?;
        let exit_code = if report.success() {
            0
        } else {
            EXIT_PARTIAL_FAILURE
        };
        Ok(CommandOutput { text, exit_code })
    }

    fn handle_plan(
        &self,
        source: &std::path::Path,
        depth: Option<usize>,
        format: OutputFormat,
    ) -> Result<CommandOutput, BackupError> {
        let source_root = config::resolve_source(source)?;
        let archive_depth = depth.unwrap_or(self.config.archive.archive_depth);
        let walker_config = crate::tree::walker::WalkerConfig {
            follow_symlinks: self.config.archive.follow_symlinks,
            excluded_file_name: self.config.archive.checksum_file_name.clone(),
        };

        let (planned, failures) = plan_partition(&source_root, archive_depth, &walker_config);
        let text = format_plan(&source_root, archive_depth, &planned, &failures, format)?;
        let exit_code = if failures.is_empty() {
            0
        } else {
            EXIT_PARTIAL_FAILURE
        };
        Ok(CommandOutput { text, exit_code })
    }

    /// Password from the flag/env, else an interactive prompt
    ///
    /// Dry runs and unencrypted configurations never prompt.
    fn resolve_password(
        &self,
        given: Option<&str>,
        dry_run: bool,
    ) -> Result<Password, BackupError> {
        if let Some(secret) = given {
            return Ok(Password::new(secret));
        }
        if dry_run || !self.config.codec.encrypt {
            return Ok(Password::new(""));
        }

        info!("No password supplied, prompting");
        let secret = dialoguer::Password::new()
            .with_prompt("Archive password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()
            .map_err(|e| BackupError::Prompt(e.to_string()))?;
        Ok(Password::new(secret))
    }
}
