//! Explicit-map parser.
//!
//! Emits one entry per pair of the resolved map: the project-level
//! `magento-map-overwrite` value for this package name when present,
//! otherwise the package's own declared `map`. No filesystem access; the
//! sources are taken on faith and validated at deploy time.

use crate::config::ProjectConfig;
use crate::core::{MagedeployError, Result};
use crate::mapping::{Mapping, MappingEntry};
use crate::package::Package;
use std::collections::BTreeMap;
use tracing::debug;

pub fn parse(package: &Package, config: &ProjectConfig) -> Result<Mapping> {
    let resolved: &BTreeMap<String, serde_json::Value> =
        match config.map_overrides.get(&package.name) {
            Some(overridden) => {
                debug!(package = %package.name, "using project-level map override");
                overridden
            }
            None => package.extra.map.as_ref().ok_or_else(|| {
                MagedeployError::MalformedMap {
                    package: package.name.clone(),
                    reason: "explicit-map parser selected but no map is declared".to_string(),
                }
            })?,
        };

    let mut entries = Vec::with_capacity(resolved.len());
    for (source, dest) in resolved {
        let dest = dest.as_str().ok_or_else(|| MagedeployError::MalformedMap {
            package: package.name.clone(),
            reason: format!("destination for '{source}' is not a path string"),
        })?;
        entries.push(MappingEntry::new(source, dest));
    }
    Ok(Mapping::from_entries(entries))
}
