//! magedeploy CLI entry point.
//!
//! Parses arguments, runs the selected command, and renders failures as
//! user-friendly errors with suggestions.

use anyhow::Result;
use clap::Parser;
use magedeploy_cli::cli;
use magedeploy_cli::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let context = user_friendly_error(e);
            context.display();
            std::process::exit(1);
        }
    }
}
