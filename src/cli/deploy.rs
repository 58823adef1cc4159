//! The `deploy` command.

use crate::config::ProjectConfig;
use crate::core::MagedeployError;
use crate::installer::{Installer, project_modules};
use crate::package::Package;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::Path;

#[derive(Args)]
pub struct DeployCommand {
    /// Package names to deploy; all installed modules when omitted
    packages: Vec<String>,
}

impl DeployCommand {
    pub fn execute(self, project_dir: &Path, config: ProjectConfig) -> Result<()> {
        let modules = project_modules(&config, project_dir)?;
        let selected = select_packages(modules, &self.packages)?;
        let mut installer = Installer::new(config)?;

        let report = installer.deploy_all(&selected);
        for name in &report.succeeded {
            println!("{} {}", "deployed".green(), name);
        }
        if !report.is_ok() {
            anyhow::bail!("deployment finished with failures: {report}");
        }
        Ok(())
    }
}

/// Filters the installed modules down to the requested names, erroring on a
/// name that is not installed. An empty request selects everything.
pub(super) fn select_packages(
    modules: Vec<Package>,
    requested: &[String],
) -> Result<Vec<Package>> {
    if requested.is_empty() {
        return Ok(modules);
    }
    for name in requested {
        if !modules.iter().any(|m| &m.name == name) {
            return Err(MagedeployError::PackageNotFound { name: name.clone() }.into());
        }
    }
    Ok(modules.into_iter().filter(|m| requested.contains(&m.name)).collect())
}
