//! Project-level deployment configuration.
//!
//! Loaded once per installer construction from the root package's
//! `composer.json` `extra` section and read-only afterwards. Every
//! recognized option is an explicit, typed field here and is validated at
//! load time: a missing `magento-root-dir` or an unknown strategy name fails
//! construction, not the first package that happens to hit it.
//!
//! The configuration is always passed explicitly into the selector and the
//! parsers rather than read from ambient state, so each package's resolution
//! can be unit tested in isolation.

use crate::composer::{self, RootComposer};
use crate::core::{MagedeployError, Result};
use crate::deploy::StrategyKind;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Validated project configuration for one installer run.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Absolute path of the target application root. All deployment writes
    /// stay under this directory.
    pub magento_root_dir: PathBuf,
    /// Absolute path of the composer vendor directory
    pub vendor_dir: PathBuf,
    /// Project-wide default strategy; `copy` applies when unset
    pub default_strategy: Option<StrategyKind>,
    /// Per-package strategy overrides, keyed by exact package name. These
    /// beat the package's own declared strategy.
    pub strategy_overrides: BTreeMap<String, StrategyKind>,
    /// Per-package explicit-map overrides, keyed by exact package name.
    /// These beat the package's own declared map and force the explicit-map
    /// parser. Values are validated by the parser.
    pub map_overrides: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
    /// Symlink targets are absolute instead of relative
    pub absolute_symlinks: bool,
}

impl ProjectConfig {
    /// Loads and validates the configuration from `<project_dir>/composer.json`.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let root = composer::load_root(project_dir)?;
        Self::from_root(project_dir, root)
    }

    /// Builds a validated configuration from parsed root composer metadata.
    pub fn from_root(project_dir: &Path, root: RootComposer) -> Result<Self> {
        let magento_root = root.extra.magento_root_dir.ok_or_else(|| {
            MagedeployError::ConfigError {
                message: "'extra.magento-root-dir' is required in the root composer.json"
                    .to_string(),
            }
        })?;

        let default_strategy = root
            .extra
            .deploy_strategy
            .as_deref()
            .map(str::parse)
            .transpose()?;

        let mut strategy_overrides = BTreeMap::new();
        for (package, name) in root.extra.deploy_strategy_overwrite {
            strategy_overrides.insert(package, name.parse()?);
        }

        Ok(Self {
            magento_root_dir: absolutize(project_dir, &magento_root),
            vendor_dir: absolutize(project_dir, &root.config.vendor_dir),
            default_strategy,
            strategy_overrides,
            map_overrides: root.extra.map_overwrite,
            absolute_symlinks: root.extra.absolute_symlinks,
        })
    }
}

fn absolutize(project_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() { path.to_path_buf() } else { project_dir.join(path) }
}
