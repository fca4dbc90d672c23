//! CLI parse: clap types for dirvault. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dirvault CLI - incremental encrypted archival of directory trees
#[derive(Parser)]
#[command(name = "dirvault")]
#[command(about = "Incremental, depth-bounded encrypted archival of directory trees")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Report rendering
#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Archive every changed directory under SOURCE
    Run {
        /// Source root to archive
        source: PathBuf,

        /// Destination root mirroring the source layout
        #[arg(long, short = 'o')]
        destination: PathBuf,

        /// Depth at which whole subtrees are archived (root = 0)
        #[arg(long, short = 'd')]
        depth: Option<usize>,

        /// Archive password (prompted when omitted)
        #[arg(long, env = "DIRVAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Decide and fingerprint without writing archives or checksums
        #[arg(long)]
        dry_run: bool,

        /// Report format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show how SOURCE partitions into archival units at a depth
    Plan {
        /// Source root to inspect
        source: PathBuf,

        /// Depth at which whole subtrees are archived (root = 0)
        #[arg(long, short = 'd')]
        depth: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}
