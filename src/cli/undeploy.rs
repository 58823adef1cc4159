//! The `undeploy` command.

use super::deploy::select_packages;
use crate::config::ProjectConfig;
use crate::installer::{Installer, project_modules};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Args)]
pub struct UndeployCommand {
    /// Package names to remove; all installed modules when omitted
    packages: Vec<String>,
}

impl UndeployCommand {
    pub fn execute(self, project_dir: &Path, config: ProjectConfig) -> Result<()> {
        let modules = project_modules(&config, project_dir)?;
        let selected = select_packages(modules, &self.packages)?;
        let mut installer = Installer::new(config)?;

        let report = installer.undeploy_all(&selected);
        for name in &report.succeeded {
            println!("{} {}", "removed".green(), name);
        }
        if !report.is_ok() {
            anyhow::bail!("removal finished with failures: {report}");
        }
        Ok(())
    }
}
