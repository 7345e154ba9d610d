//! Command line interface for icon_convert.
//!
//! Parses arguments, runs the conversion pipeline, and reports results with
//! colored terminal output.

mod args;
pub mod commands;
mod output;

pub use args::{Args, RuntimeConfig, parse_dimensions};
pub use commands::execute_command;
pub use output::OutputManager;

/// Parse arguments without executing
pub fn parse_args() -> Args {
    Args::parse_args()
}
