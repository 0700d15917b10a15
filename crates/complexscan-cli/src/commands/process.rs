//! `complexscan process` command implementation

use crate::error::Result;
use colored::Colorize;
use complexscan_pipeline::results::process_results;
use complexscan_pipeline::PipelineConfig;

/// Normalize all raw search results into the final table
pub async fn run(config: &PipelineConfig) -> Result<()> {
    let summary = process_results(&config.paths)?;

    match &summary.output {
        Some(output) => {
            println!(
                "{} {} rows written to {}",
                "✓".green(),
                summary.rows,
                output.display()
            );
        },
        None => println!("{}", "No results were processed.".yellow()),
    }
    println!("  Result files:     {}", summary.files);
    println!("  Raw hits:         {}", summary.raw_hits);
    if summary.failed_files > 0 {
        println!(
            "  Unreadable files:  {}",
            summary.failed_files.to_string().red()
        );
    }
    if summary.malformed_lines > 0 {
        println!(
            "  Malformed lines:  {}",
            summary.malformed_lines.to_string().yellow()
        );
    }

    Ok(())
}
