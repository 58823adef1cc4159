//! The `list` command.
//!
//! Shows each installed module with its resolved strategy and parser, and
//! whether (and when) it is currently deployed according to the state file.

use crate::config::ProjectConfig;
use crate::installer::{Installer, project_modules};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Args)]
pub struct ListCommand {}

impl ListCommand {
    pub fn execute(self, project_dir: &Path, config: ProjectConfig) -> Result<()> {
        let modules = project_modules(&config, project_dir)?;
        let installer = Installer::new(config)?;

        if modules.is_empty() {
            println!("no magento-module packages installed");
            return Ok(());
        }

        for package in &modules {
            let resolution = match installer.resolve(package) {
                Ok((strategy, mapping)) => {
                    format!("{strategy}, {} mapping entries", mapping.len())
                }
                Err(e) => format!("{} {e}", "unresolvable:".red()),
            };
            let status = match installer.state().get(&package.name) {
                Some(record) => format!(
                    "{} {} ({} files)",
                    "deployed".green(),
                    record.deployed_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    record.log.len()
                ),
                None => "not deployed".dimmed().to_string(),
            };
            println!("{}  [{resolution}]  {status}", package.name.bold());
        }
        Ok(())
    }
}
