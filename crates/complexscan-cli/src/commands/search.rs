//! `complexscan search` command implementation

use crate::error::Result;
use colored::Colorize;
use complexscan_pipeline::executor::ProcessRunner;
use complexscan_pipeline::power::platform_power;
use complexscan_pipeline::search::run_search;
use complexscan_pipeline::PipelineConfig;

/// Search all profiles against all proteomes
///
/// Fails with a shutdown error, after issuing the host shutdown, when a
/// laptop is on battery and `force_run` is not set.
pub async fn run(config: &PipelineConfig, force_run: bool, force: bool) -> Result<()> {
    let host = platform_power();
    let summary = run_search(&ProcessRunner, config, host.as_ref(), force_run, force).await?;

    println!(
        "{} {} profiles x {} proteomes on {} ({} CPUs)",
        "✓".green(),
        summary.profiles,
        summary.proteomes,
        summary.host,
        summary.cpus
    );
    println!("  Searches completed:  {}", summary.completed);
    println!("  Already done:        {}", summary.already_done);
    if summary.failed > 0 {
        println!("  Failed:              {}", summary.failed.to_string().red());
    }
    println!(
        "  Results:             {}",
        config.paths.search_results_root().display()
    );

    Ok(())
}
