//! Profile search against proteomes with hmmsearch
//!
//! Every profile is searched against every proteome, one invocation at a
//! time, with a tabular hit listing per pair. Between profiles the stage
//! pauses for a cooldown. Nothing is searched until the power gate has
//! decided the host may run unattended.

use crate::config::PipelineConfig;
use crate::executor::{execute, CommandRunner, ToolCommand};
use crate::power::{cpu_allocation, enforce, log_host, HostClass, HostPower};
use crate::progress::stage_progress;
use crate::stage::{file_stem, is_done, list_files};
use complexscan_common::{Result, ScanError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Extension of profile inputs
pub const PROFILE_EXTENSION: &str = "hmm";

/// Extension of proteome inputs
pub const PROTEOME_EXTENSION: &str = "faa";

/// Suffix of every raw result file
pub const RESULTS_SUFFIX: &str = "_results.txt";

/// `<results_root>/<profile_stem>/<proteome_stem>_results.txt`
pub fn result_path(results_root: &Path, profile: &Path, proteome: &Path) -> PathBuf {
    results_root
        .join(file_stem(profile))
        .join(format!("{}{}", file_stem(proteome), RESULTS_SUFFIX))
}

pub fn search_command(
    hmmsearch_bin: &str,
    cpus: usize,
    result: &Path,
    profile: &Path,
    proteome: &Path,
) -> ToolCommand {
    ToolCommand::new(hmmsearch_bin)
        .arg("--cpu")
        .arg(cpus.to_string())
        .arg("--noali")
        .arg("--tblout")
        .path_arg(result)
        .path_arg(profile)
        .path_arg(proteome)
}

/// Counts for one search run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub host: HostClass,
    pub cpus: usize,
    pub profiles: usize,
    pub proteomes: usize,
    pub completed: usize,
    pub already_done: usize,
    pub failed: usize,
    pub cooldowns: usize,
}

/// Run every profile against every proteome
///
/// Missing profile or proteome directories are configuration faults and are
/// reported before the host is inspected. A shutdown decision returns
/// [`ScanError::PowerShutdown`] before any search is issued.
pub async fn run_search(
    runner: &dyn CommandRunner,
    config: &PipelineConfig,
    host: &dyn HostPower,
    force_run: bool,
    force: bool,
) -> Result<SearchSummary> {
    let paths = &config.paths;
    let tools = &config.tools;

    for dir in [&paths.profiles_dir, &paths.proteomes_dir] {
        if !dir.is_dir() {
            return Err(ScanError::missing_input(dir.clone()));
        }
    }

    let host_class = host.host_class();
    let cpus = cpu_allocation(host_class, tools.laptop_cpu_cap);
    log_host(host_class, cpus);
    enforce(host, force_run)?;

    let profiles = list_files(&paths.profiles_dir, PROFILE_EXTENSION)?;
    let proteomes = list_files(&paths.proteomes_dir, PROTEOME_EXTENSION)?;
    let results_root = paths.search_results_root();
    info!(
        profiles = profiles.len(),
        proteomes = proteomes.len(),
        "📂 Found proteome files to process"
    );

    let mut summary = SearchSummary {
        host: host_class,
        cpus,
        profiles: profiles.len(),
        proteomes: proteomes.len(),
        completed: 0,
        already_done: 0,
        failed: 0,
        cooldowns: 0,
    };

    for (index, profile) in profiles.iter().enumerate() {
        let profile_name = file_stem(profile);
        fs::create_dir_all(results_root.join(&profile_name))?;
        info!(profile = %profile_name, "🔍 Processing HMM profile");

        let mut issued = false;
        let pb = stage_progress(proteomes.len(), &format!("{} Search", profile_name));
        for proteome in &proteomes {
            let result = result_path(&results_root, profile, proteome);
            pb.inc(1);

            if !force && is_done(&result) {
                debug!(result = %result.display(), "Search result present, skipping");
                summary.already_done += 1;
                continue;
            }

            issued = true;
            let command = search_command(&tools.hmmsearch_bin, cpus, &result, profile, proteome);
            if execute(runner, &command).await.is_some() {
                info!(
                    profile = %profile_name,
                    proteome = %file_stem(proteome),
                    "✅ HMMER search completed"
                );
                summary.completed += 1;
            } else {
                // A truncated table would look done on the next run
                if result.exists() {
                    fs::remove_file(&result)?;
                }
                summary.failed += 1;
            }
        }
        pb.finish_and_clear();

        let is_last = index + 1 == profiles.len();
        if issued && !is_last {
            info!(
                profile = %profile_name,
                seconds = tools.cooldown_secs,
                "🛑 Cooling period after processing profile"
            );
            tokio::time::sleep(tools.cooldown()).await;
            summary.cooldowns += 1;
        }
    }

    info!(
        completed = summary.completed,
        already_done = summary.already_done,
        failed = summary.failed,
        "✅ HMMER search completed successfully!"
    );
    Ok(summary)
}
