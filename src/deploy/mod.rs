//! Deploy strategies: placing mapped files into the application root.
//!
//! A strategy instance is bound to one package's source root and the
//! project's application root, and is stateless across packages. The four
//! variants share one contract, [`DeployStrategy`]:
//!
//! - [`copy`] - recursive copy, overwriting existing files
//! - [`symlink`] - symbolic links, relative by default
//! - [`hardlink`] - hard links, failing across filesystem boundaries
//! - [`none`] - intentional no-op placement
//!
//! `deploy` returns a [`DeployLog`] of everything it placed; `remove`
//! consumes that log on uninstall. The log rather than the mapping drives
//! removal so that uninstalls delete exactly what was placed, tracked
//! across process runs through the state file.
//!
//! There is no cross-entry rollback: a failing entry aborts the remaining
//! entries of its package and leaves already-placed ones on disk.
//! Individual file copies land via temp-then-rename, so no single file is
//! ever half-written.

pub mod copy;
pub mod hardlink;
pub mod none;
pub mod symlink;

use crate::config::ProjectConfig;
use crate::core::{MagedeployError, Result};
use crate::mapping::{Mapping, MappingEntry, modman::is_glob};
use crate::package::Package;
use crate::utils::fs::is_safe_path;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The closed set of deploy strategies.
///
/// Selected by name through [`FromStr`]; the recognized names are `copy`,
/// `symlink`, `link`, and `none`, matching what packages and project
/// configuration declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Recursive copy into the application root
    Copy,
    /// Symbolic links pointing back into the vendor directory
    Symlink,
    /// Hard links; requires source and destination on one filesystem
    #[serde(rename = "link")]
    HardLink,
    /// Skip placement entirely
    #[serde(rename = "none")]
    NoOp,
}

impl FromStr for StrategyKind {
    type Err = MagedeployError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "copy" => Ok(Self::Copy),
            "symlink" => Ok(Self::Symlink),
            "link" => Ok(Self::HardLink),
            "none" => Ok(Self::NoOp),
            other => Err(MagedeployError::UnknownStrategy { name: other.to_string() }),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Copy => "copy",
            Self::Symlink => "symlink",
            Self::HardLink => "link",
            Self::NoOp => "none",
        };
        write!(f, "{name}")
    }
}

/// One file a strategy placed under the application root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedFile {
    /// Destination path, relative to the application root
    pub dest: String,
    /// Content checksum at deploy time; only the copy strategy records one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Everything one strategy invocation placed, in placement order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployLog {
    /// Placed files
    pub files: Vec<DeployedFile>,
}

impl DeployLog {
    /// Records one placed file.
    pub fn push(&mut self, dest: String, checksum: Option<String>) {
        self.files.push(DeployedFile { dest, checksum });
    }

    /// Number of placed files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when nothing was placed.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// The shared capability of all deploy strategies.
pub trait DeployStrategy {
    /// Places every entry of the mapping, returning the log of what landed
    /// where.
    fn deploy(&self, mapping: &Mapping) -> Result<DeployLog>;

    /// Reverses a previous deployment using its log, then prunes directories
    /// the removal emptied.
    fn remove(&self, log: &DeployLog) -> Result<()>;

    /// The variant implementing this instance.
    fn kind(&self) -> StrategyKind;
}

/// Builds the strategy instance for a package, bound to the package's source
/// directory and the configured application root.
pub fn strategy_for(
    kind: StrategyKind,
    package: &Package,
    config: &ProjectConfig,
) -> Box<dyn DeployStrategy> {
    let source_root = package.source_dir.clone();
    let dest_root = config.magento_root_dir.clone();
    match kind {
        StrategyKind::Copy => Box::new(copy::CopyStrategy::new(source_root, dest_root)),
        StrategyKind::Symlink => Box::new(symlink::SymlinkStrategy::new(
            source_root,
            dest_root,
            config.absolute_symlinks,
        )),
        StrategyKind::HardLink => {
            Box::new(hardlink::HardLinkStrategy::new(source_root, dest_root))
        }
        StrategyKind::NoOp => Box::new(none::NoOpStrategy),
    }
}

/// A mapping entry resolved to absolute source and destination paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EntryTarget {
    /// Absolute path of the existing source
    pub source: PathBuf,
    /// Absolute destination path under the application root
    pub dest: PathBuf,
}

/// Resolves one mapping entry to concrete targets.
///
/// - glob sources expand to their matches, each landing inside the
///   destination treated as a directory
/// - a directory (or file) source whose destination already exists as a
///   real directory lands inside it, matching `cp src dst` semantics
/// - entries escaping either root are rejected before any mutation
/// - a literal source that does not exist is an error naming the entry
pub(crate) fn resolve_entry(
    source_root: &Path,
    dest_root: &Path,
    entry: &MappingEntry,
) -> Result<Vec<EntryTarget>> {
    if !is_safe_path(dest_root, Path::new(&entry.dest)) {
        return Err(MagedeployError::UnsafePath { path: entry.dest.clone() });
    }
    if !is_safe_path(source_root, Path::new(&entry.source)) {
        return Err(MagedeployError::UnsafePath { path: entry.source.clone() });
    }

    let dest_abs = dest_root.join(&entry.dest);

    if is_glob(&entry.source) {
        let pattern = source_root.join(&entry.source);
        let matches = glob::glob(&pattern.to_string_lossy())
            .map_err(|e| {
                MagedeployError::fs(
                    "glob",
                    entry.source.clone(),
                    io::Error::new(io::ErrorKind::InvalidInput, e),
                )
            })?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| MagedeployError::fs("glob", entry.source.clone(), e.into_error()))?;

        if matches.is_empty() {
            return Err(MagedeployError::fs(
                "glob",
                entry.source.clone(),
                io::Error::new(io::ErrorKind::NotFound, "glob pattern matched no files"),
            ));
        }

        return Ok(matches
            .into_iter()
            .filter_map(|source| {
                let name = source.file_name()?.to_owned();
                Some(EntryTarget { source, dest: dest_abs.join(name) })
            })
            .collect());
    }

    let source_abs = source_root.join(&entry.source);
    if !source_abs.exists() {
        return Err(MagedeployError::fs(
            "deploy",
            source_abs.display(),
            io::Error::new(io::ErrorKind::NotFound, "mapping source does not exist"),
        ));
    }

    // dir-into-dir / file-into-dir placement when the destination already
    // exists as a real directory. A matching final component means the
    // destination IS the target, not a parent to nest under; otherwise a
    // redeployed `skin skin` entry would land at skin/skin.
    let dest = if dest_abs.is_dir() && !dest_abs.is_symlink() {
        match source_abs.file_name() {
            Some(name) if dest_abs.file_name() != Some(name) => dest_abs.join(name),
            _ => dest_abs,
        }
    } else {
        dest_abs
    };

    Ok(vec![EntryTarget { source: source_abs, dest }])
}

/// Renders an absolute destination as an application-root-relative string
/// for the deploy log.
pub(crate) fn log_path(dest_root: &Path, dest: &Path) -> String {
    dest.strip_prefix(dest_root)
        .unwrap_or(dest)
        .to_string_lossy()
        .into_owned()
}
