//! `complexscan aggregate` command implementation

use crate::error::Result;
use colored::Colorize;
use complexscan_pipeline::aggregate::aggregate;
use complexscan_pipeline::PipelineConfig;

/// Merge both sequence sources into one file per subunit
pub async fn run(config: &PipelineConfig) -> Result<()> {
    let summary = aggregate(&config.paths)?;

    println!(
        "{} {} subunit files written to {}",
        "✓".green(),
        summary.outputs.len(),
        config.paths.clustered_dir.display()
    );
    println!("  Sequence files found:  {}", summary.gathered);
    println!("  Staged:                {}", summary.staged);
    if summary.skipped > 0 {
        println!("  Skipped:               {}", summary.skipped.to_string().yellow());
    }

    Ok(())
}
