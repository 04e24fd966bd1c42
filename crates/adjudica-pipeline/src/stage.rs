//! Stage and observer abstractions

use crate::{ClaimContext, StageStatus};
use tracing::{debug, info, warn};

/// One step of a claim run.
///
/// Business outcomes (e.g. a claim without facts) are reported by calling
/// [`ClaimContext::fail`]; an `Err` or a panic is reserved for unexpected
/// faults and is turned into [`StageStatus::Error`] by the runner.
pub trait Stage: Send {
    /// Stable stage name (e.g. "screen")
    fn name(&self) -> &str;

    /// Run the stage against the claim
    fn run(&self, ctx: &mut ClaimContext) -> anyhow::Result<()>;
}

/// Receives stage transitions: `(stage, Running)` before each stage and
/// `(stage, status)` after it
pub trait StageObserver: Send + Sync {
    /// Called on every transition
    fn on_stage(&self, claim_id: &str, stage: &str, status: StageStatus);
}

/// Observer that logs transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn on_stage(&self, claim_id: &str, stage: &str, status: StageStatus) {
        match status {
            StageStatus::Running => debug!(claim_id, stage, "Stage started"),
            StageStatus::Error => warn!(claim_id, stage, "Stage failed"),
            _ => info!(claim_id, stage, status = status.as_str(), "Stage finished"),
        }
    }
}
