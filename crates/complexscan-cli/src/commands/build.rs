//! `complexscan cluster|align|profile|build` command implementations

use crate::error::Result;
use colored::Colorize;
use complexscan_pipeline::build::{align, build_profiles, cluster, hmm, StepSummary};
use complexscan_pipeline::executor::ProcessRunner;
use complexscan_pipeline::PipelineConfig;

/// Which part of profile construction to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    Cluster,
    Align,
    Profile,
    /// Aggregation followed by all three steps
    All,
}

fn report(step: &str, summary: &StepSummary) {
    let failed = if summary.failed > 0 {
        summary.failed.to_string().red().to_string()
    } else {
        summary.failed.to_string()
    };
    println!(
        "{:<12} completed {:>4}   already done {:>4}   failed {:>4}",
        step.cyan(),
        summary.completed,
        summary.already_done,
        failed
    );
}

/// Run one construction step, or all of them
///
/// Individual tool failures are reported in the summary and do not fail the
/// command.
pub async fn run(config: &PipelineConfig, step: BuildStep, force: bool) -> Result<()> {
    let runner = ProcessRunner;

    match step {
        BuildStep::Cluster => {
            let summary = cluster::run_clustering(&runner, config, force).await?;
            report("clustering", &summary);
        },
        BuildStep::Align => {
            let summary = align::run_alignment(&runner, config, force).await?;
            report("alignment", &summary);
        },
        BuildStep::Profile => {
            let summary = hmm::run_hmmbuild(&runner, config, force).await?;
            report("profiles", &summary);
        },
        BuildStep::All => {
            super::aggregate::run(config).await?;
            let summary = build_profiles(&runner, config, force).await?;
            report("clustering", &summary.clustering);
            report("alignment", &summary.alignment);
            report("profiles", &summary.profiles);
        },
    }

    Ok(())
}
