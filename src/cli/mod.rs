//! Command-line interface for the event-replay harness

pub mod args;

pub use args::CliArgs;

use clap::Parser;

/// Parse command-line arguments, exiting with a usage message on failure
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
