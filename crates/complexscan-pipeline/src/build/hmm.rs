//! Profile HMM construction with hmmbuild

use super::cluster::CLUSTERED_EXTENSION;
use super::{StepSummary, UnitOutcome};
use crate::config::{PipelineConfig, ToolSettings};
use crate::executor::{execute, CommandRunner, ToolCommand};
use crate::progress::stage_progress;
use crate::stage::{file_stem, is_done, list_files};
use complexscan_common::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of profile files
pub const PROFILE_EXTENSION: &str = "hmm";

/// `<profiles_dir>/<alignment stem>.hmm`
///
/// Keeping the alignment stem preserves `<SUBUNIT>_<pct>_mafft`, which the
/// result normalizer splits back into its three fields.
pub fn profile_path(profiles_dir: &Path, alignment: &Path) -> PathBuf {
    profiles_dir.join(format!("{}.{}", file_stem(alignment), PROFILE_EXTENSION))
}

/// hmmbuild with no sequence weighting and fixed column/fragment thresholds
pub fn hmmbuild_command(
    tools: &ToolSettings,
    profile_name: &str,
    output: &Path,
    alignment: &Path,
) -> ToolCommand {
    ToolCommand::new(&tools.hmmbuild_bin)
        .arg("--amino")
        .arg("--cpu")
        .arg(tools.threads.to_string())
        .arg("-n")
        .arg(profile_name)
        .arg("--wnone")
        .arg("--symfrac")
        .arg(tools.hmmbuild_symfrac.to_string())
        .arg("--fragthresh")
        .arg(tools.hmmbuild_fragthresh.to_string())
        .arg("--plaplace")
        .path_arg(output)
        .path_arg(alignment)
}

/// Build one profile from one alignment
pub async fn build_profile(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    alignment: &Path,
    force: bool,
) -> Result<UnitOutcome> {
    let profile_name = file_stem(alignment);
    let output = profile_path(&config.paths.profiles_dir, alignment);

    if !force && is_done(&output) {
        debug!(output = %output.display(), "Profile present, skipping");
        return Ok(UnitOutcome::AlreadyDone);
    }

    let command = hmmbuild_command(&config.tools, &profile_name, &output, alignment);
    if execute(runner, &command).await.is_none() {
        // hmmbuild may leave a truncated profile behind
        if output.exists() {
            fs::remove_file(&output)?;
        }
        return Ok(UnitOutcome::Failed);
    }

    info!(profile = %output.display(), "✅ HMM profile generated");
    Ok(UnitOutcome::Completed)
}

/// Build a profile for every alignment, in file-name order
pub async fn run_hmmbuild(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    force: bool,
) -> Result<StepSummary> {
    let alignments = list_files(&config.paths.msa_dir, CLUSTERED_EXTENSION)?;
    fs::create_dir_all(&config.paths.profiles_dir)?;
    info!(count = alignments.len(), "Building HMM profiles");

    let pb = stage_progress(alignments.len(), "Building HMM profiles");
    let mut summary = StepSummary::default();
    for alignment in &alignments {
        summary.record(build_profile(runner, config, alignment, force).await?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(summary)
}
