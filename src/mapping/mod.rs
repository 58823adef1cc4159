//! File-mapping resolution.
//!
//! A mapping answers the question "which files of this package go where
//! under the application root". Three parser variants produce one, each
//! rooted in a different declaration convention:
//!
//! - [`map`] - an explicit map in the package's (or the project's) composer
//!   `extra` metadata
//! - [`modman`] - a line-oriented `modman` file at the package source root
//! - [`package_xml`] - a Magento Connect `package.xml` manifest
//!
//! Which variant applies is decided by [`crate::selector::select_parser`];
//! the probe order there is part of the engine's contract.

pub mod map;
pub mod modman;
pub mod package_xml;

use crate::config::ProjectConfig;
use crate::core::Result;
use crate::package::Package;
use std::fmt;

/// One source-to-destination pair, both paths relative: the source to the
/// package's extracted directory, the destination to the application root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Path relative to the package source root; may be a glob for modman
    /// mappings
    pub source: String,
    /// Path relative to the application root
    pub dest: String,
}

impl MappingEntry {
    /// Creates an entry, normalizing away leading `./` and `/` and trailing
    /// slashes on both sides.
    pub fn new(source: &str, dest: &str) -> Self {
        Self { source: normalize_rel(source), dest: normalize_rel(dest) }
    }
}

fn normalize_rel(path: &str) -> String {
    let mut p = path.trim();
    loop {
        if let Some(rest) = p.strip_prefix("./") {
            p = rest;
        } else if let Some(rest) = p.strip_prefix('/') {
            p = rest;
        } else {
            break;
        }
    }
    p.trim_end_matches('/').to_string()
}

/// The resolved mapping of one package: an ordered sequence of entries,
/// deduplicated by destination.
///
/// Two sources may not legally write the same destination; when a parser
/// emits duplicate destinations the last one wins, preserving the position
/// of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: Vec<MappingEntry>,
}

impl Mapping {
    /// Builds a mapping from parser output, applying destination dedup.
    pub fn from_entries(entries: impl IntoIterator<Item = MappingEntry>) -> Self {
        let mut result: Vec<MappingEntry> = Vec::new();
        for entry in entries {
            if let Some(existing) = result.iter_mut().find(|e| e.dest == entry.dest) {
                existing.source = entry.source;
            } else {
                result.push(entry);
            }
        }
        Self { entries: result }
    }

    /// The deduplicated entries, in declaration order.
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the mapping resolved to no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The closed set of mapping parser variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserKind {
    /// Explicit map from composer `extra` metadata
    ExplicitMap,
    /// Line-oriented `modman` file
    Modman,
    /// Magento Connect `package.xml` manifest
    PackageXml,
}

impl fmt::Display for ParserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ExplicitMap => "map",
            Self::Modman => "modman",
            Self::PackageXml => "package.xml",
        };
        write!(f, "{name}")
    }
}

impl ParserKind {
    /// Runs the parser variant against a package, producing its resolved
    /// mapping. No filesystem is mutated; parse failures abort the package's
    /// operation before any deployment starts.
    pub fn parse(self, package: &Package, config: &ProjectConfig) -> Result<Mapping> {
        match self {
            Self::ExplicitMap => map::parse(package, config),
            Self::Modman => modman::parse(package),
            Self::PackageXml => package_xml::parse(package),
        }
    }
}
