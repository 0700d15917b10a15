//! Redundancy reduction with MMseqs2
//!
//! For each concatenated `<SUBUNIT>.faa`, builds an MMseqs2 database in a
//! private scratch directory, clusters it at the configured minimum identity,
//! and writes one representative per cluster to `<SUBUNIT>_<pct>.fasta`.

use super::{StepSummary, UnitOutcome};
use crate::aggregate::SEQUENCE_EXTENSION;
use crate::config::{PipelineConfig, ToolSettings};
use crate::executor::{execute, CommandRunner, ToolCommand};
use crate::progress::stage_progress;
use crate::stage::{file_stem, is_done, list_files};
use complexscan_common::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension of clustered representative files
pub const CLUSTERED_EXTENSION: &str = "fasta";

/// `<clustered_dir>/<stem>_<pct>.fasta`
pub fn clustered_path(clustered_dir: &Path, stem: &str, threshold_percent: u32) -> PathBuf {
    clustered_dir.join(format!(
        "{}_{}.{}",
        stem, threshold_percent, CLUSTERED_EXTENSION
    ))
}

/// The four MMseqs2 invocations for one input, in order
pub fn cluster_commands(
    tools: &ToolSettings,
    input: &Path,
    stem: &str,
    scratch: &Path,
    output: &Path,
) -> Vec<ToolCommand> {
    let db = scratch.join(format!("{}_db", stem));
    let cluster_db = scratch.join(format!("{}_db_clu", stem));
    let subset_db = scratch.join(format!("{}_db_clu_rep", stem));

    vec![
        ToolCommand::new(&tools.mmseqs_bin)
            .arg("createdb")
            .path_arg(input)
            .path_arg(&db),
        ToolCommand::new(&tools.mmseqs_bin)
            .arg("cluster")
            .path_arg(&db)
            .path_arg(&cluster_db)
            .path_arg(scratch)
            .arg("--min-seq-id")
            .arg(tools.cluster_min_seq_id.to_string())
            .arg("--threads")
            .arg(tools.threads.to_string()),
        ToolCommand::new(&tools.mmseqs_bin)
            .arg("createsubdb")
            .path_arg(&cluster_db)
            .path_arg(&db)
            .path_arg(&subset_db),
        ToolCommand::new(&tools.mmseqs_bin)
            .arg("convert2fasta")
            .path_arg(&subset_db)
            .path_arg(output),
    ]
}

/// Recreate an empty scratch directory
///
/// Leftovers from an interrupted run are removed first so MMseqs2 never sees
/// a half-built database.
fn reset_scratch(scratch: &Path) -> Result<()> {
    if scratch.exists() {
        fs::remove_dir_all(scratch)?;
    }
    fs::create_dir_all(scratch)?;
    Ok(())
}

/// Cluster one concatenated sequence file
pub async fn cluster_file(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    input: &Path,
    force: bool,
) -> Result<UnitOutcome> {
    let tools = &config.tools;
    let clustered_dir = &config.paths.clustered_dir;
    let stem = file_stem(input);
    let output = clustered_path(clustered_dir, &stem, tools.threshold_percent());

    if !force && is_done(&output) {
        debug!(output = %output.display(), "Clustered file present, skipping");
        return Ok(UnitOutcome::AlreadyDone);
    }

    let scratch = config.paths.cluster_scratch_root().join(&stem);
    reset_scratch(&scratch)?;

    for command in cluster_commands(tools, input, &stem, &scratch, &output) {
        if execute(runner, &command).await.is_none() {
            warn!(input = %input.display(), "⚠️ Clustering aborted for this file");
            if output.exists() {
                fs::remove_file(&output)?;
            }
            return Ok(UnitOutcome::Failed);
        }
    }

    fs::remove_dir_all(&scratch)?;
    info!(output = %output.display(), "✅ Clustered sequences saved");
    Ok(UnitOutcome::Completed)
}

/// Cluster every `<SUBUNIT>.faa` in the clustering working area
pub async fn run_clustering(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    force: bool,
) -> Result<StepSummary> {
    let inputs = list_files(&config.paths.clustered_dir, SEQUENCE_EXTENSION)?;
    info!(
        count = inputs.len(),
        min_seq_id = config.tools.cluster_min_seq_id,
        "Running MMseqs2 clustering"
    );

    let pb = stage_progress(inputs.len(), "Running MMseqs2 clustering");
    let mut summary = StepSummary::default();
    for input in &inputs {
        summary.record(cluster_file(runner, config, input, force).await?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(summary)
}
