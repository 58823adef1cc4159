//! No-op deploy strategy.
//!
//! Intentionally places nothing: used for packages whose files are metadata
//! only or are deployed by another mechanism. The installer still runs the
//! selected parser before this strategy, so mapping errors surface even
//! though nothing is written.

use crate::core::Result;
use crate::deploy::{DeployLog, DeployStrategy, StrategyKind};
use crate::mapping::Mapping;
use tracing::debug;

pub struct NoOpStrategy;

impl DeployStrategy for NoOpStrategy {
    fn deploy(&self, mapping: &Mapping) -> Result<DeployLog> {
        debug!(entries = mapping.len(), "no-op strategy, skipping placement");
        Ok(DeployLog::default())
    }

    fn remove(&self, _log: &DeployLog) -> Result<()> {
        Ok(())
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::NoOp
    }
}
