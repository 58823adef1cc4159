//! Command-line interface for magedeploy.
//!
//! The deployment engine is a library first; this CLI is a thin driver for
//! running the composer lifecycle by hand, outside a plugin host:
//!
//! - `deploy` - deploy all installed module packages, or the named ones
//! - `undeploy` - remove deployed packages using the recorded state
//! - `list` - show installed modules, their resolution, and deploy state
//!
//! All commands read the project's `composer.json` and
//! `vendor/composer/installed.json`; nothing is fetched or resolved here.

mod deploy;
mod list;
mod undeploy;

use crate::config::ProjectConfig;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Main CLI structure.
#[derive(Parser)]
#[command(name = "magedeploy", version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project directory containing composer.json (defaults to the current
    /// directory)
    #[arg(long, global = true, value_name = "DIR")]
    project_dir: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy installed magento-module packages into the application root
    Deploy(deploy::DeployCommand),
    /// Remove deployed packages using the recorded deploy state
    Undeploy(undeploy::UndeployCommand),
    /// List installed modules with their strategy, parser, and state
    List(list::ListCommand),
}

impl Cli {
    /// Executes the parsed command.
    pub fn execute(self) -> Result<()> {
        self.init_tracing();

        let project_dir = match self.project_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let config = ProjectConfig::load(&project_dir)?;

        match self.command {
            Commands::Deploy(cmd) => cmd.execute(&project_dir, config),
            Commands::Undeploy(cmd) => cmd.execute(&project_dir, config),
            Commands::List(cmd) => cmd.execute(&project_dir, config),
        }
    }

    fn init_tracing(&self) {
        let filter = if self.verbose {
            EnvFilter::new("debug")
        } else if self.quiet {
            EnvFilter::new("error")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    }
}
