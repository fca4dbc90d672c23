//! CLI domain: parse, route, output and presentation only.
//! The archival work itself lives in the engine.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, OutputFormat};
pub use presentation::{format_pass_report, format_plan};
pub use route::{CommandOutput, RunContext, EXIT_PARTIAL_FAILURE};
