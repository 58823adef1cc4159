//! Strategy and parser selection.
//!
//! Given a package's declared metadata and the project configuration, pick
//! the deploy strategy and the mapping parser for that package. Both
//! decisions are pure precedence rules over data already in memory plus, for
//! parser detection, two filesystem probes at the package source root; their
//! order is part of the engine's contract.
//!
//! Strategy precedence, first match wins:
//! 1. project `magento-deploystrategy-overwrite` entry for this package name
//! 2. the package's own `magento-deploystrategy`
//! 3. project default `magento-deploystrategy`
//! 4. `copy`
//!
//! Parser detection, first match wins:
//! 1. a project map override for this package name, or the package's own
//!    non-null `map`, selects the explicit-map parser - an explicit map is
//!    never shadowed by a coincidentally present modman file
//! 2. a `modman` file at the package source root
//! 3. a `package-xml` extra key naming a file that exists at the source root
//! 4. otherwise the package has no mapping source and selection fails

use crate::config::ProjectConfig;
use crate::core::{MagedeployError, Result};
use crate::deploy::StrategyKind;
use crate::mapping::{ParserKind, modman::MODMAN_FILE};
use crate::package::Package;
use tracing::debug;

/// Selects the deploy strategy for a package.
pub fn select_strategy(package: &Package, config: &ProjectConfig) -> Result<StrategyKind> {
    if let Some(kind) = config.strategy_overrides.get(&package.name) {
        debug!(package = %package.name, strategy = %kind, "strategy from project override");
        return Ok(*kind);
    }
    if let Some(name) = package.extra.deploy_strategy.as_deref() {
        return name.parse();
    }
    Ok(config.default_strategy.unwrap_or(StrategyKind::Copy))
}

/// Detects the mapping parser for a package.
pub fn select_parser(package: &Package, config: &ProjectConfig) -> Result<ParserKind> {
    if config.map_overrides.contains_key(&package.name) || package.extra.map.is_some() {
        return Ok(ParserKind::ExplicitMap);
    }
    if package.source_dir.join(MODMAN_FILE).is_file() {
        return Ok(ParserKind::Modman);
    }
    if let Some(manifest) = package.extra.package_xml.as_deref() {
        if package.source_dir.join(manifest).is_file() {
            return Ok(ParserKind::PackageXml);
        }
    }
    Err(MagedeployError::NoMappingSource { package: package.name.clone() })
}
