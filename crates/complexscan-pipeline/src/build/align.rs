//! Multiple sequence alignment with MAFFT
//!
//! Every clustered file is aligned independently with L-INS-i style
//! parameters (`--localpair` plus a fixed iteration cap). MAFFT writes the
//! alignment to stdout; it is written to `<stem>_mafft.fasta` only when the
//! run succeeds.

use super::cluster::CLUSTERED_EXTENSION;
use super::{StepSummary, UnitOutcome};
use crate::config::{PipelineConfig, ToolSettings};
use crate::executor::{execute, CommandRunner, ToolCommand};
use crate::progress::stage_progress;
use crate::stage::{file_stem, is_done, list_files};
use complexscan_common::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix appended to alignment stems; becomes the profile's third name field
pub const ALIGNMENT_SUFFIX: &str = "mafft";

/// `<msa_dir>/<stem>_mafft.fasta`
pub fn alignment_path(msa_dir: &Path, input: &Path) -> PathBuf {
    msa_dir.join(format!(
        "{}_{}.{}",
        file_stem(input),
        ALIGNMENT_SUFFIX,
        CLUSTERED_EXTENSION
    ))
}

pub fn mafft_command(tools: &ToolSettings, input: &Path) -> ToolCommand {
    ToolCommand::new(&tools.mafft_bin)
        .arg("--localpair")
        .arg("--maxiterate")
        .arg(tools.mafft_max_iterate.to_string())
        .arg("--quiet")
        .arg("--thread")
        .arg(tools.threads.to_string())
        .path_arg(input)
}

/// Write through a sibling temp file so a partial alignment never looks done
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("fasta.partial");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Align one clustered file
pub async fn align_file(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    input: &Path,
    force: bool,
) -> Result<UnitOutcome> {
    let output = alignment_path(&config.paths.msa_dir, input);

    if !force && is_done(&output) {
        debug!(output = %output.display(), "Alignment present, skipping");
        return Ok(UnitOutcome::AlreadyDone);
    }

    let Some(alignment) = execute(runner, &mafft_command(&config.tools, input)).await else {
        return Ok(UnitOutcome::Failed);
    };

    if alignment.trim().is_empty() {
        warn!(input = %input.display(), "⚠️ MAFFT produced an empty alignment, nothing written");
        return Ok(UnitOutcome::Failed);
    }

    write_atomically(&output, &alignment)?;
    info!(output = %output.display(), "✅ MAFFT alignment saved");
    Ok(UnitOutcome::Completed)
}

/// Align every clustered file, in file-name order
pub async fn run_alignment(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    force: bool,
) -> Result<StepSummary> {
    let inputs = list_files(&config.paths.clustered_dir, CLUSTERED_EXTENSION)?;
    fs::create_dir_all(&config.paths.msa_dir)?;
    info!(count = inputs.len(), "Running MAFFT");

    let pb = stage_progress(inputs.len(), "Running MAFFT");
    let mut summary = StepSummary::default();
    for input in &inputs {
        summary.record(align_file(runner, config, input, force).await?);
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(summary)
}
