//! Installer orchestration.
//!
//! Drives the per-package lifecycle the host package manager raises events
//! for: install, update, uninstall. Each operation runs the same pipeline
//! over one package:
//!
//! ```text
//! select (strategy, parser) -> parse mapping -> deploy / remove -> record state
//! ```
//!
//! Selection and parsing failures abort a package's operation before any
//! filesystem mutation. Deploy-time failures abort that package's remaining
//! entries without undoing the ones already placed. Batch operations keep
//! going after one package fails and report every failure at the end.
//!
//! Packages are processed sequentially in input order; overlapping
//! destination directories between packages make naive parallel deployment
//! race on directory creation, so none is attempted.

use crate::composer;
use crate::config::ProjectConfig;
use crate::core::{MAGENTO_MODULE_TYPE, MagedeployError};
use crate::deploy::{StrategyKind, strategy_for};
use crate::mapping::Mapping;
use crate::package::Package;
use crate::selector::{select_parser, select_strategy};
use crate::state::DeployState;
use anyhow::{Context, Result};
use std::fmt;
use tracing::{debug, info, warn};

/// Orchestrates deployment for one project.
///
/// Holds the validated project configuration and the persistent deploy
/// state; construction loads both, and every lifecycle method saves the
/// state back after changing it.
pub struct Installer {
    config: ProjectConfig,
    state: DeployState,
}

impl Installer {
    /// Creates an installer for a loaded project configuration.
    pub fn new(config: ProjectConfig) -> Result<Self> {
        let state = DeployState::load(&config.magento_root_dir)?;
        Ok(Self { config, state })
    }

    /// Whether this installer is responsible for a composer package type.
    ///
    /// True only for the exact string `magento-module`.
    #[must_use]
    pub fn supports(package_type: &str) -> bool {
        package_type == MAGENTO_MODULE_TYPE
    }

    /// The project configuration this installer runs with.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// The current deploy state.
    pub fn state(&self) -> &DeployState {
        &self.state
    }

    /// Resolves a package to its strategy and mapping without touching the
    /// filesystem under the application root.
    pub fn resolve(&self, package: &Package) -> Result<(StrategyKind, Mapping)> {
        let strategy = select_strategy(package, &self.config)?;
        let parser = select_parser(package, &self.config)?;
        debug!(
            package = %package.name,
            strategy = %strategy,
            parser = %parser,
            "resolved package"
        );
        let mapping = parser.parse(package, &self.config)?;
        Ok((strategy, mapping))
    }

    /// Deploys a package. A package already recorded in the state is
    /// redeployed: its previous placement is removed first, using the
    /// previous log, then the current mapping is deployed.
    pub fn install(&mut self, package: &Package) -> Result<()> {
        if !Self::supports(&package.package_type) {
            return Err(MagedeployError::UnsupportedPackageType {
                package_type: package.package_type.clone(),
            }
            .into());
        }

        if self.state.get(&package.name).is_some() {
            self.remove_recorded(package)
                .with_context(|| format!("failed to remove previous deployment of '{}'", package.name))?;
            // keep the lock file truthful even if the redeploy fails below
            self.state.save()?;
        }

        let (kind, mapping) = self
            .resolve(package)
            .with_context(|| format!("failed to resolve package '{}'", package.name))?;
        let strategy = strategy_for(kind, package, &self.config);
        let log = strategy
            .deploy(&mapping)
            .with_context(|| format!("failed to deploy package '{}'", package.name))?;

        info!(
            package = %package.name,
            strategy = %kind,
            files = log.len(),
            "deployed package"
        );
        self.state.record(&package.name, package.version.clone(), kind, log);
        self.state.save()?;
        Ok(())
    }

    /// Removes a package's deployment using its recorded log. A package
    /// with no record is a warning, not an error.
    pub fn uninstall(&mut self, package: &Package) -> Result<()> {
        if self.state.get(&package.name).is_none() {
            warn!(package = %package.name, "no recorded deployment, nothing to remove");
            return Ok(());
        }
        self.remove_recorded(package)
            .with_context(|| format!("failed to remove package '{}'", package.name))?;
        self.state.save()?;
        info!(package = %package.name, "removed package");
        Ok(())
    }

    /// Handles a package update: removes the old version's placement using
    /// the previously recorded log, then deploys the new version.
    pub fn update(&mut self, old: &Package, new: &Package) -> Result<()> {
        self.uninstall(old)?;
        self.install(new)
    }

    fn remove_recorded(&mut self, package: &Package) -> Result<()> {
        let Some(record) = self.state.remove(&package.name) else {
            return Ok(());
        };
        let strategy = strategy_for(record.strategy, package, &self.config);
        strategy.remove(&record.log)?;
        Ok(())
    }

    /// Deploys every given package, continuing past individual failures.
    pub fn deploy_all(&mut self, packages: &[Package]) -> BatchReport {
        let mut report = BatchReport::default();
        for package in packages {
            match self.install(package) {
                Ok(()) => report.succeeded.push(package.name.clone()),
                Err(error) => {
                    warn!(package = %package.name, "deployment failed, continuing batch");
                    report.failures.push(BatchFailure { package: package.name.clone(), error });
                }
            }
        }
        report
    }

    /// Removes every given package, continuing past individual failures.
    pub fn undeploy_all(&mut self, packages: &[Package]) -> BatchReport {
        let mut report = BatchReport::default();
        for package in packages {
            match self.uninstall(package) {
                Ok(()) => report.succeeded.push(package.name.clone()),
                Err(error) => {
                    report.failures.push(BatchFailure { package: package.name.clone(), error });
                }
            }
        }
        report
    }
}

/// Loads the installable module packages of a project, in the order the
/// package manager recorded them.
pub fn project_modules(config: &ProjectConfig, project_dir: &std::path::Path) -> Result<Vec<Package>> {
    let vendor_rel = config
        .vendor_dir
        .strip_prefix(project_dir)
        .unwrap_or(&config.vendor_dir)
        .to_path_buf();
    Ok(composer::installed_modules(project_dir, &vendor_rel)?)
}

/// One package's failure inside a batch operation.
#[derive(Debug)]
pub struct BatchFailure {
    /// The package that failed
    pub package: String,
    /// What went wrong
    pub error: anyhow::Error,
}

/// Outcome of a batch deploy or undeploy.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Packages processed successfully, in input order
    pub succeeded: Vec<String>,
    /// Packages that failed, with their errors, in input order
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// True when every package succeeded.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} succeeded, {} failed", self.succeeded.len(), self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {}: {:#}", failure.package, failure.error)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, ProjectConfig) {
        let tmp = TempDir::new().unwrap();
        let config = ProjectConfig {
            magento_root_dir: tmp.path().join("htdocs"),
            vendor_dir: tmp.path().join("vendor"),
            default_strategy: None,
            strategy_overrides: BTreeMap::new(),
            map_overrides: BTreeMap::new(),
            absolute_symlinks: false,
        };
        fs::create_dir_all(&config.magento_root_dir).unwrap();
        fs::create_dir_all(&config.vendor_dir).unwrap();
        (tmp, config)
    }

    fn module_with_modman(config: &ProjectConfig, name: &str, files: &[(&str, &str)]) -> Package {
        let dir = config.vendor_dir.join(name);
        let mut modman = String::new();
        for (source, dest) in files {
            let path = dir.join(source);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "content").unwrap();
            modman.push_str(&format!("{source} {dest}\n"));
        }
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("modman"), modman).unwrap();
        Package::new(name, dir)
    }

    #[test]
    fn supports_only_magento_modules() {
        assert!(Installer::supports("magento-module"));
        assert!(!Installer::supports("library"));
        assert!(!Installer::supports("magento-theme"));
        assert!(!Installer::supports(""));
    }

    #[test]
    fn unsupported_package_type_is_rejected() {
        let (_tmp, config) = project();
        let mut installer = Installer::new(config.clone()).unwrap();
        let mut package = Package::new("acme/lib", config.vendor_dir.join("acme/lib"));
        package.package_type = "library".to_string();

        let err = installer.install(&package).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MagedeployError>(),
            Some(MagedeployError::UnsupportedPackageType { .. })
        ));
    }

    #[test]
    fn install_then_uninstall_round_trips() {
        let (_tmp, config) = project();
        let package = module_with_modman(
            &config,
            "acme/widget",
            &[("app/etc/modules/Foo.xml", "app/etc/modules/Foo.xml")],
        );
        let root = config.magento_root_dir.clone();
        let mut installer = Installer::new(config).unwrap();

        installer.install(&package).unwrap();
        assert!(root.join("app/etc/modules/Foo.xml").is_file());
        assert!(installer.state().get("acme/widget").is_some());

        installer.uninstall(&package).unwrap();
        assert!(!root.join("app/etc/modules/Foo.xml").exists());
        assert!(installer.state().get("acme/widget").is_none());
    }

    #[test]
    fn state_survives_across_installer_instances() {
        let (_tmp, config) = project();
        let package = module_with_modman(
            &config,
            "acme/widget",
            &[("lib/Acme.php", "lib/Acme.php")],
        );

        Installer::new(config.clone()).unwrap().install(&package).unwrap();

        // fresh installer, as composer would start for the uninstall event
        let mut second = Installer::new(config.clone()).unwrap();
        assert_eq!(second.state().len(), 1);
        second.uninstall(&package).unwrap();
        assert!(!config.magento_root_dir.join("lib/Acme.php").exists());
    }

    #[test]
    fn failed_redeploy_still_clears_the_saved_record() {
        let (_tmp, config) = project();
        let package = module_with_modman(
            &config,
            "acme/widget",
            &[("lib/Acme.php", "lib/Acme.php")],
        );
        let mut installer = Installer::new(config.clone()).unwrap();
        installer.install(&package).unwrap();

        // the package loses its mapping source, so the redeploy's resolve
        // fails after the old placement is already gone
        fs::remove_file(package.source_dir.join("modman")).unwrap();
        installer.install(&package).unwrap_err();

        let reloaded = Installer::new(config.clone()).unwrap();
        assert!(reloaded.state().get("acme/widget").is_none());
        assert!(!config.magento_root_dir.join("lib/Acme.php").exists());
    }

    #[test]
    fn update_removes_old_files_before_deploying_new() {
        let (_tmp, config) = project();
        let old = module_with_modman(
            &config,
            "acme/widget",
            &[("lib/Old.php", "lib/Old.php")],
        );
        let root = config.magento_root_dir.clone();
        let mut installer = Installer::new(config.clone()).unwrap();
        installer.install(&old).unwrap();

        // new version renames the file
        fs::remove_file(old.source_dir.join("modman")).unwrap();
        let new = module_with_modman(
            &config,
            "acme/widget",
            &[("lib/New.php", "lib/New.php")],
        );

        installer.update(&old, &new).unwrap();
        assert!(!root.join("lib/Old.php").exists());
        assert!(root.join("lib/New.php").is_file());
    }

    #[test]
    fn uninstall_without_record_is_a_no_op() {
        let (_tmp, config) = project();
        let package = Package::new("acme/ghost", config.vendor_dir.join("acme/ghost"));
        let mut installer = Installer::new(config).unwrap();
        installer.uninstall(&package).unwrap();
    }

    #[test]
    fn batch_continues_after_one_failure() {
        let (_tmp, config) = project();
        let good = module_with_modman(
            &config,
            "acme/good",
            &[("lib/Good.php", "lib/Good.php")],
        );
        // no mapping source at all
        let bad_dir = config.vendor_dir.join("acme/bad");
        fs::create_dir_all(&bad_dir).unwrap();
        let bad = Package::new("acme/bad", bad_dir);
        let also_good = module_with_modman(
            &config,
            "acme/also-good",
            &[("lib/Also.php", "lib/Also.php")],
        );
        let root = config.magento_root_dir.clone();

        let mut installer = Installer::new(config).unwrap();
        let report = installer.deploy_all(&[good, bad, also_good]);

        assert!(!report.is_ok());
        assert_eq!(report.succeeded, vec!["acme/good", "acme/also-good"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].package, "acme/bad");
        assert!(root.join("lib/Good.php").is_file());
        assert!(root.join("lib/Also.php").is_file());
    }

    #[test]
    fn none_strategy_still_surfaces_parser_errors() {
        let (_tmp, config) = project();
        let dir = config.vendor_dir.join("acme/broken");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("modman"), "only-one-token\n").unwrap();
        let package = Package::new("acme/broken", dir);

        let mut config = config;
        config.strategy_overrides.insert("acme/broken".to_string(), StrategyKind::NoOp);
        let mut installer = Installer::new(config).unwrap();

        let err = installer.install(&package).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<MagedeployError>(),
            Some(MagedeployError::ModmanParse { .. })
        ));
    }

    #[test]
    fn redeploy_replaces_previous_placement() {
        let (_tmp, config) = project();
        let package = module_with_modman(
            &config,
            "acme/widget",
            &[("lib/A.php", "lib/A.php")],
        );
        let root = config.magento_root_dir.clone();
        let mut installer = Installer::new(config).unwrap();
        installer.install(&package).unwrap();

        // mapping changes between deploys
        fs::write(package.source_dir.join("lib/B.php"), "content").unwrap();
        fs::write(package.source_dir.join("modman"), "lib/B.php lib/B.php\n").unwrap();

        installer.install(&package).unwrap();
        assert!(!root.join("lib/A.php").exists());
        assert!(root.join("lib/B.php").is_file());
    }

    #[test]
    fn project_modules_reads_installed_json() {
        let (tmp, config) = project();
        let composer_dir = config.vendor_dir.join("composer");
        fs::create_dir_all(&composer_dir).unwrap();
        fs::write(
            composer_dir.join("installed.json"),
            r#"{"packages": [{"name": "acme/widget", "type": "magento-module"}]}"#,
        )
        .unwrap();

        let modules = project_modules(&config, tmp.path()).unwrap();
        assert_eq!(modules.len(), 1);
        assert_eq!(modules[0].name, "acme/widget");
    }
}
