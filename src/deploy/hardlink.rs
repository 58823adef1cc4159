//! Hard link deploy strategy.
//!
//! Same placement contract as the symlink strategy, but with hard links:
//! directory sources are walked and every file inside is linked
//! individually, since directories cannot be hard linked. Source and
//! destination must live on one filesystem; crossing a device boundary
//! raises [`CrossDeviceLink`](crate::core::MagedeployError::CrossDeviceLink)
//! with guidance to fall back to the copy strategy.
//!
//! Linked files share content with the vendor tree, so the log records
//! checksums and `remove` deletes exactly the tracked paths.

use crate::core::{MagedeployError, Result};
use crate::deploy::{DeployLog, DeployStrategy, StrategyKind, log_path, resolve_entry};
use crate::mapping::Mapping;
use crate::utils::fs::{file_checksum, prune_empty_dirs};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub struct HardLinkStrategy {
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl HardLinkStrategy {
    pub fn new(source_root: PathBuf, dest_root: PathBuf) -> Self {
        Self { source_root, dest_root }
    }

    fn link_file(&self, source: &Path, dest: &Path, log: &mut DeployLog) -> Result<()> {
        if fs::symlink_metadata(dest).is_ok() {
            if same_file(source, dest) {
                debug!(dest = %dest.display(), "hard link already in place");
                log.push(log_path(&self.dest_root, dest), file_checksum(dest).ok());
                return Ok(());
            }
            return Err(MagedeployError::DestinationConflict {
                path: dest.display().to_string(),
            });
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| MagedeployError::fs("mkdir", parent.display(), e))?;
        }
        fs::hard_link(source, dest).map_err(|e| {
            if e.kind() == io::ErrorKind::CrossesDevices {
                MagedeployError::CrossDeviceLink {
                    source_path: source.display().to_string(),
                    dest_path: dest.display().to_string(),
                }
            } else {
                MagedeployError::fs("link", dest.display(), e)
            }
        })?;

        let checksum = file_checksum(dest).ok();
        log.push(log_path(&self.dest_root, dest), checksum);
        Ok(())
    }
}

/// Whether two paths refer to the same underlying file.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(ma), Ok(mb)) => ma.dev() == mb.dev() && ma.ino() == mb.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(_a: &Path, _b: &Path) -> bool {
    false
}

impl DeployStrategy for HardLinkStrategy {
    fn deploy(&self, mapping: &Mapping) -> Result<DeployLog> {
        let mut log = DeployLog::default();
        for entry in mapping.entries() {
            for target in resolve_entry(&self.source_root, &self.dest_root, entry)? {
                if target.source.is_dir() {
                    for item in WalkDir::new(&target.source) {
                        let item = item.map_err(|e| {
                            MagedeployError::fs(
                                "walk",
                                target.source.display(),
                                e.into_io_error().unwrap_or_else(|| {
                                    io::Error::new(io::ErrorKind::Other, "walkdir loop")
                                }),
                            )
                        })?;
                        if !item.file_type().is_file() {
                            continue;
                        }
                        let rel =
                            item.path().strip_prefix(&target.source).unwrap_or(item.path());
                        self.link_file(item.path(), &target.dest.join(rel), &mut log)?;
                    }
                } else {
                    self.link_file(&target.source, &target.dest, &mut log)?;
                }
            }
        }
        debug!(links = log.len(), "hard link deployment complete");
        Ok(log)
    }

    fn remove(&self, log: &DeployLog) -> Result<()> {
        for file in &log.files {
            let dest = self.dest_root.join(&file.dest);
            match fs::symlink_metadata(&dest) {
                Ok(_) => {
                    fs::remove_file(&dest)
                        .map_err(|e| MagedeployError::fs("remove", dest.display(), e))?;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = %file.dest, "already gone, skipping");
                }
                Err(e) => return Err(MagedeployError::fs("remove", dest.display(), e)),
            }
            if let Some(parent) = dest.parent() {
                prune_empty_dirs(&self.dest_root, parent)
                    .map_err(|e| MagedeployError::fs("prune", parent.display(), e))?;
            }
        }
        Ok(())
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::HardLink
    }
}
