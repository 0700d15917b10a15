//! Profile construction: clustering, alignment, and HMM building
//!
//! Each step walks its input directory one file at a time, hands the heavy
//! lifting to an external tool, and leaves one output file per input. A
//! failing invocation is logged and the step moves on; the absent output file
//! is the only record of the failure, and the next run picks it up again.

pub mod align;
pub mod cluster;
pub mod hmm;

use crate::config::PipelineConfig;
use crate::executor::CommandRunner;
use complexscan_common::Result;
use serde::Serialize;
use tracing::info;

/// Result of one unit of work within a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    Completed,
    AlreadyDone,
    Failed,
}

/// Per-step counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepSummary {
    pub completed: usize,
    pub already_done: usize,
    pub failed: usize,
}

impl StepSummary {
    pub fn record(&mut self, outcome: UnitOutcome) {
        match outcome {
            UnitOutcome::Completed => self.completed += 1,
            UnitOutcome::AlreadyDone => self.already_done += 1,
            UnitOutcome::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.completed + self.already_done + self.failed
    }
}

/// Counts for a full clustering → alignment → profile run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    pub clustering: StepSummary,
    pub alignment: StepSummary,
    pub profiles: StepSummary,
}

/// Run clustering, alignment and profile building in order
pub async fn build_profiles(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    force: bool,
) -> Result<BuildSummary> {
    let clustering = cluster::run_clustering(runner, config, force).await?;
    let alignment = align::run_alignment(runner, config, force).await?;
    let profiles = hmm::run_hmmbuild(runner, config, force).await?;

    info!(
        clustered = clustering.completed + clustering.already_done,
        aligned = alignment.completed + alignment.already_done,
        profiles = profiles.completed + profiles.already_done,
        "✅ HMM Pipeline Execution Complete"
    );

    Ok(BuildSummary {
        clustering,
        alignment,
        profiles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_summary_record() {
        let mut summary = StepSummary::default();
        summary.record(UnitOutcome::Completed);
        summary.record(UnitOutcome::Failed);
        summary.record(UnitOutcome::AlreadyDone);
        summary.record(UnitOutcome::Completed);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.already_done, 1);
        assert_eq!(summary.total(), 4);
    }
}
