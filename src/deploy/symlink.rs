//! Symlink deploy strategy.
//!
//! Places one symbolic link per mapping entry (or per glob match), pointing
//! back into the package's source tree. Link targets are relative to the
//! link's own directory unless `magento-absolute-symlinks` is set.
//!
//! A destination that already exists and is exactly the expected link makes
//! redeployment idempotent; anything else there is a
//! [`DestinationConflict`](crate::core::MagedeployError::DestinationConflict)
//! and deployment fails rather than overwriting. `remove` unlinks only links
//! that still point into this package's source directory.

use crate::core::{MagedeployError, Result};
use crate::deploy::{DeployLog, DeployStrategy, StrategyKind, log_path, resolve_entry};
use crate::mapping::Mapping;
use crate::utils::fs::{normalize_path, prune_empty_dirs, relative_path};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct SymlinkStrategy {
    source_root: PathBuf,
    dest_root: PathBuf,
    absolute: bool,
}

impl SymlinkStrategy {
    pub fn new(source_root: PathBuf, dest_root: PathBuf, absolute: bool) -> Self {
        Self { source_root, dest_root, absolute }
    }

    fn link_target(&self, source: &Path, dest: &Path) -> PathBuf {
        if self.absolute {
            source.to_path_buf()
        } else {
            let parent = dest.parent().unwrap_or(&self.dest_root);
            relative_path(parent, source)
        }
    }

    /// Resolves where an existing link points, relative targets resolved
    /// against the link's directory.
    fn points_to(&self, link: &Path) -> Option<PathBuf> {
        let target = fs::read_link(link).ok()?;
        let resolved = if target.is_absolute() {
            target
        } else {
            link.parent()?.join(target)
        };
        Some(normalize_path(&resolved))
    }
}

#[cfg(unix)]
fn make_symlink(target: &Path, dest: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, dest)
}

#[cfg(windows)]
fn make_symlink(target: &Path, dest: &Path) -> io::Result<()> {
    let resolved = match dest.parent() {
        Some(parent) if target.is_relative() => parent.join(target),
        _ => target.to_path_buf(),
    };
    if resolved.is_dir() {
        std::os::windows::fs::symlink_dir(target, dest)
    } else {
        std::os::windows::fs::symlink_file(target, dest)
    }
}

impl DeployStrategy for SymlinkStrategy {
    fn deploy(&self, mapping: &Mapping) -> Result<DeployLog> {
        let mut log = DeployLog::default();
        for entry in mapping.entries() {
            for target in resolve_entry(&self.source_root, &self.dest_root, entry)? {
                let link = self.link_target(&target.source, &target.dest);

                if fs::symlink_metadata(&target.dest).is_ok() {
                    let expected = normalize_path(&target.source);
                    if self.points_to(&target.dest) == Some(expected) {
                        debug!(dest = %target.dest.display(), "link already in place");
                        log.push(log_path(&self.dest_root, &target.dest), None);
                        continue;
                    }
                    return Err(MagedeployError::DestinationConflict {
                        path: target.dest.display().to_string(),
                    });
                }

                if let Some(parent) = target.dest.parent() {
                    fs::create_dir_all(parent)
                        .map_err(|e| MagedeployError::fs("mkdir", parent.display(), e))?;
                }
                make_symlink(&link, &target.dest)
                    .map_err(|e| MagedeployError::fs("symlink", target.dest.display(), e))?;
                log.push(log_path(&self.dest_root, &target.dest), None);
            }
        }
        debug!(links = log.len(), "symlink deployment complete");
        Ok(log)
    }

    fn remove(&self, log: &DeployLog) -> Result<()> {
        let source_root = normalize_path(&self.source_root);
        for file in &log.files {
            let dest = self.dest_root.join(&file.dest);
            match fs::symlink_metadata(&dest) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    match self.points_to(&dest) {
                        Some(resolved) if resolved.starts_with(&source_root) => {
                            fs::remove_file(&dest)
                                .map_err(|e| MagedeployError::fs("unlink", dest.display(), e))?;
                        }
                        _ => {
                            warn!(
                                path = %file.dest,
                                "link no longer points into this package, leaving it"
                            );
                            continue;
                        }
                    }
                }
                Ok(_) => {
                    warn!(path = %file.dest, "destination is no longer a symlink, leaving it");
                    continue;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %file.dest, "already gone, skipping");
                }
                Err(e) => return Err(MagedeployError::fs("unlink", dest.display(), e)),
            }
            if let Some(parent) = dest.parent() {
                prune_empty_dirs(&self.dest_root, parent)
                    .map_err(|e| MagedeployError::fs("prune", parent.display(), e))?;
            }
        }
        Ok(())
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Symlink
    }
}
