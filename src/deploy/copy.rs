//! Copy deploy strategy.
//!
//! Recursively copies mapped sources into the application root, overwriting
//! files already there. Every placed file is logged together with its
//! content checksum; `remove` deletes exactly the logged paths and nothing
//! else, warning when a file changed on disk since it was placed.

use crate::core::{MagedeployError, Result};
use crate::deploy::{DeployLog, DeployStrategy, StrategyKind, log_path, resolve_entry};
use crate::mapping::Mapping;
use crate::utils::fs::{atomic_copy, file_checksum, prune_empty_dirs};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub struct CopyStrategy {
    source_root: PathBuf,
    dest_root: PathBuf,
}

impl CopyStrategy {
    pub fn new(source_root: PathBuf, dest_root: PathBuf) -> Self {
        Self { source_root, dest_root }
    }

    fn copy_file(&self, source: &Path, dest: &Path, log: &mut DeployLog) -> Result<()> {
        atomic_copy(source, dest).map_err(|e| MagedeployError::fs("copy", dest.display(), e))?;
        let checksum = file_checksum(dest)
            .map_err(|e| MagedeployError::fs("checksum", dest.display(), e))?;
        log.push(log_path(&self.dest_root, dest), Some(checksum));
        Ok(())
    }

    fn copy_tree(&self, source: &Path, dest: &Path, log: &mut DeployLog) -> Result<()> {
        for item in WalkDir::new(source) {
            let item = item.map_err(|e| {
                MagedeployError::fs(
                    "walk",
                    source.display(),
                    e.into_io_error().unwrap_or_else(|| {
                        std::io::Error::new(std::io::ErrorKind::Other, "walkdir loop")
                    }),
                )
            })?;
            if !item.file_type().is_file() {
                continue;
            }
            let rel = item.path().strip_prefix(source).unwrap_or(item.path());
            self.copy_file(item.path(), &dest.join(rel), log)?;
        }
        Ok(())
    }
}

impl DeployStrategy for CopyStrategy {
    fn deploy(&self, mapping: &Mapping) -> Result<DeployLog> {
        let mut log = DeployLog::default();
        for entry in mapping.entries() {
            for target in resolve_entry(&self.source_root, &self.dest_root, entry)? {
                if target.source.is_dir() {
                    self.copy_tree(&target.source, &target.dest, &mut log)?;
                } else {
                    self.copy_file(&target.source, &target.dest, &mut log)?;
                }
            }
        }
        debug!(files = log.len(), "copy deployment complete");
        Ok(log)
    }

    fn remove(&self, log: &DeployLog) -> Result<()> {
        for file in &log.files {
            let dest = self.dest_root.join(&file.dest);
            match fs::symlink_metadata(&dest) {
                Ok(_) => {
                    if let Some(recorded) = file.checksum.as_ref() {
                        if file_checksum(&dest).is_ok_and(|current| &current != recorded) {
                            warn!(path = %file.dest, "file changed since deployment, removing anyway");
                        }
                    }
                    fs::remove_file(&dest)
                        .map_err(|e| MagedeployError::fs("remove", dest.display(), e))?;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
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
        StrategyKind::Copy
    }
}
