//! Reading composer metadata produced by the host package manager.
//!
//! magedeploy does not resolve, fetch, or extract packages itself. It
//! consumes two files Composer leaves on disk:
//!
//! - `composer.json` at the project root, whose `extra` section carries the
//!   project-level deployment configuration (see [`crate::config`])
//! - `vendor/composer/installed.json`, the list of installed packages with
//!   their declared `extra` metadata
//!
//! Both the Composer 2 `{"packages": [...]}` wrapper and the older bare
//! array form of `installed.json` are accepted.

use crate::core::{MAGENTO_MODULE_TYPE, MagedeployError, Result};
use crate::package::{Package, PackageExtra};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Raw root `composer.json` contents, limited to the parts magedeploy reads.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RootComposer {
    /// The `extra` section with project-level deployment configuration
    pub extra: RootExtra,
    /// The `config` section, read for `vendor-dir`
    pub config: ComposerConfig,
}

/// Recognized keys of the root package's `extra` section.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RootExtra {
    /// Destination application root, relative to the project dir. Required.
    #[serde(rename = "magento-root-dir")]
    pub magento_root_dir: Option<String>,

    /// Project-wide default deploy strategy name
    #[serde(rename = "magento-deploystrategy")]
    pub deploy_strategy: Option<String>,

    /// Per-package strategy overrides, keyed by exact package name
    #[serde(rename = "magento-deploystrategy-overwrite")]
    pub deploy_strategy_overwrite: BTreeMap<String, String>,

    /// Per-package explicit-map overrides, keyed by exact package name
    #[serde(rename = "magento-map-overwrite")]
    pub map_overwrite: BTreeMap<String, BTreeMap<String, serde_json::Value>>,

    /// Create absolute symlink targets instead of relative ones
    #[serde(rename = "magento-absolute-symlinks")]
    pub absolute_symlinks: bool,
}

/// The `config` section of `composer.json`.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Vendor directory, relative to the project dir
    #[serde(rename = "vendor-dir")]
    pub vendor_dir: String,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self { vendor_dir: "vendor".to_string() }
    }
}

/// One package record in `installed.json`.
#[derive(Debug, Deserialize)]
struct InstalledPackage {
    name: String,
    #[serde(default)]
    version: Option<String>,
    #[serde(rename = "type", default)]
    package_type: String,
    #[serde(default)]
    extra: PackageExtra,
}

/// `installed.json` in either its Composer 2 or Composer 1 shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstalledJson {
    V2 { packages: Vec<InstalledPackage> },
    V1(Vec<InstalledPackage>),
}

impl InstalledJson {
    fn into_packages(self) -> Vec<InstalledPackage> {
        match self {
            Self::V2 { packages } => packages,
            Self::V1(packages) => packages,
        }
    }
}

fn parse_error(path: &Path, reason: impl ToString) -> MagedeployError {
    MagedeployError::ComposerParseError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Loads the root `composer.json` from a project directory.
pub fn load_root(project_dir: &Path) -> Result<RootComposer> {
    let path = project_dir.join("composer.json");
    let content = fs::read_to_string(&path).map_err(|e| parse_error(&path, e))?;
    serde_json::from_str(&content).map_err(|e| parse_error(&path, e))
}

/// Loads the installed-package list and returns the `magento-module`
/// packages, in the order Composer recorded them.
///
/// Each package's source dir is `<vendor_dir>/<name>`. Packages of other
/// types are skipped; processing order within one run follows the input
/// order, which is the only ordering guarantee the engine makes.
pub fn installed_modules(project_dir: &Path, vendor_dir: &Path) -> Result<Vec<Package>> {
    let path = project_dir.join(vendor_dir).join("composer").join("installed.json");
    let content = fs::read_to_string(&path).map_err(|e| parse_error(&path, e))?;
    let installed: InstalledJson =
        serde_json::from_str(&content).map_err(|e| parse_error(&path, e))?;

    let modules = installed
        .into_packages()
        .into_iter()
        .filter(|p| p.package_type == MAGENTO_MODULE_TYPE)
        .map(|p| {
            let source_dir = project_dir.join(vendor_dir).join(&p.name);
            Package {
                name: p.name,
                version: p.version,
                package_type: p.package_type,
                source_dir,
                extra: p.extra,
            }
        })
        .collect();
    Ok(modules)
}
