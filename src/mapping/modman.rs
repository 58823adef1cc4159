//! Modman file parser.
//!
//! Reads the line-oriented `modman` file at the package source root. Each
//! non-empty, non-comment line carries a whitespace-separated source and
//! destination token; anything else is a parse error. Sources may contain
//! glob patterns, which are expanded at deploy time; literal sources must
//! already exist under the package directory when the mapping is resolved.

use crate::core::{MagedeployError, Result};
use crate::mapping::{Mapping, MappingEntry};
use crate::package::Package;
use std::fs;
use tracing::debug;

/// File name probed at the package source root.
pub const MODMAN_FILE: &str = "modman";

/// True when a mapping source contains glob metacharacters.
pub(crate) fn is_glob(source: &str) -> bool {
    source.contains(['*', '?', '['])
}

pub fn parse(package: &Package) -> Result<Mapping> {
    let path = package.source_dir.join(MODMAN_FILE);
    let content = fs::read_to_string(&path)
        .map_err(|e| MagedeployError::fs("read", path.display(), e))?;

    let mut entries = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [source, dest] = tokens.as_slice() else {
            return Err(MagedeployError::ModmanParse {
                path: path.display().to_string(),
                line: index + 1,
                reason: format!(
                    "expected '<source> <destination>', found {} token(s)",
                    tokens.len()
                ),
            });
        };

        let entry = MappingEntry::new(source, dest);
        if !is_glob(&entry.source) && !package.source_dir.join(&entry.source).exists() {
            return Err(MagedeployError::ModmanParse {
                path: path.display().to_string(),
                line: index + 1,
                reason: format!("source path '{}' does not exist in the package", entry.source),
            });
        }
        entries.push(entry);
    }

    debug!(package = %package.name, entries = entries.len(), "parsed modman file");
    Ok(Mapping::from_entries(entries))
}
