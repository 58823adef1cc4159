//! Persistent deploy state.
//!
//! Uninstalls must delete exactly what a deployment placed, and composer
//! lifecycle events arrive in separate process runs, so the installer
//! records every package's [`DeployLog`] in a state file at the application
//! root (`.magedeploy.lock`). The file is JSON, written atomically, and is
//! the only thing magedeploy persists.
//!
//! A missing state file is an empty state; a present but unparsable one is
//! a hard error, since guessing at what was deployed risks deleting files
//! this tool never placed.

use crate::core::{MagedeployError, Result};
use crate::deploy::{DeployLog, StrategyKind};
use crate::utils::fs::atomic_write;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the deploy state, stored at the application root.
pub const STATE_FILE: &str = ".magedeploy.lock";

const STATE_VERSION: u32 = 1;

/// Recorded deployment of one package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageState {
    /// Package version at deploy time, if declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Strategy that placed the files; removal uses the same one
    pub strategy: StrategyKind,
    /// What was placed, application-root relative
    pub log: DeployLog,
    /// When the deployment happened
    pub deployed_at: DateTime<Utc>,
}

/// The state of all deployed packages for one application root.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DeployState {
    version: u32,
    packages: BTreeMap<String, PackageState>,
    #[serde(skip)]
    path: PathBuf,
}

impl DeployState {
    /// Loads the state from an application root, starting empty when no
    /// state file exists yet.
    pub fn load(root_dir: &Path) -> Result<Self> {
        let path = root_dir.join(STATE_FILE);
        if !path.exists() {
            return Ok(Self { version: STATE_VERSION, packages: BTreeMap::new(), path });
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| MagedeployError::fs("read", path.display(), e))?;
        let mut state: Self =
            serde_json::from_str(&content).map_err(|e| MagedeployError::StateParseError {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        state.path = path;
        debug!(packages = state.packages.len(), "loaded deploy state");
        Ok(state)
    }

    /// Writes the state back to its file atomically.
    pub fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        atomic_write(&self.path, content.as_bytes()).map_err(|e| {
            MagedeployError::fs("write", self.path.display(), std::io::Error::other(e))
        })
    }

    /// Records a package's deployment, replacing any previous record.
    pub fn record(
        &mut self,
        name: &str,
        version: Option<String>,
        strategy: StrategyKind,
        log: DeployLog,
    ) {
        self.packages.insert(
            name.to_string(),
            PackageState { version, strategy, log, deployed_at: Utc::now() },
        );
    }

    /// Removes and returns a package's record.
    pub fn remove(&mut self, name: &str) -> Option<PackageState> {
        self.packages.remove(name)
    }

    /// Looks up a package's record.
    pub fn get(&self, name: &str) -> Option<&PackageState> {
        self.packages.get(name)
    }

    /// All recorded packages, sorted by name.
    pub fn packages(&self) -> impl Iterator<Item = (&String, &PackageState)> {
        self.packages.iter()
    }

    /// Number of recorded packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// True when no package is recorded.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
