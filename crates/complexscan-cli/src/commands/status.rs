//! `complexscan status` command implementation
//!
//! Reports what each stage has produced, read entirely from disk.

use crate::error::Result;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use complexscan_pipeline::stage::PipelineStatus;
use complexscan_pipeline::PipelineConfig;
use std::path::Path;

/// One table row per stage output
pub fn status_rows(config: &PipelineConfig, status: &PipelineStatus) -> Vec<[String; 3]> {
    let paths = &config.paths;
    let row = |stage: &str, dir: &Path, count: String| {
        [stage.to_string(), dir.display().to_string(), count]
    };

    vec![
        row("CDS sequences", &paths.cds_seqs_dir, status.cds_sequence_files.to_string()),
        row(
            "InterPro sequences",
            &paths.interpro_seqs_dir,
            status.interpro_sequence_files.to_string(),
        ),
        row("Staged subunits", &paths.combined_dir, status.staged_subunits.to_string()),
        row("Concatenated", &paths.clustered_dir, status.concatenated_files.to_string()),
        row("Clustered", &paths.clustered_dir, status.clustered_files.to_string()),
        row("Alignments", &paths.msa_dir, status.alignments.to_string()),
        row("Profiles", &paths.profiles_dir, status.profiles.to_string()),
        row("Proteomes", &paths.proteomes_dir, status.proteomes.to_string()),
        row(
            "Search results",
            &paths.search_results_root(),
            format!("{}/{}", status.search_results, status.expected_search_results),
        ),
        row(
            "Processed table",
            &paths.processed_results_file(),
            if status.processed_table { "yes" } else { "no" }.to_string(),
        ),
    ]
}

/// Show stage status as a table or JSON
pub async fn run(config: &PipelineConfig, json: bool) -> Result<()> {
    let status = PipelineStatus::collect(&config.paths)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Stage", "Location", "Files"]);
    for row in status_rows(config, &status) {
        table.add_row(row.to_vec());
    }

    println!("{}", "Pipeline Status:".cyan().bold());
    println!("{table}");

    if status.search_results < status.expected_search_results {
        println!(
            "{} {} searches still to run",
            "→".yellow(),
            status.expected_search_results - status.search_results
        );
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_cover_every_stage() {
        let config = PipelineConfig::from_base_dir("/work");
        let status = PipelineStatus {
            profiles: 3,
            proteomes: 4,
            search_results: 5,
            expected_search_results: 12,
            ..Default::default()
        };
        let rows = status_rows(&config, &status);
        assert_eq!(rows.len(), 10);
        let search = rows.iter().find(|r| r[0] == "Search results").unwrap();
        assert_eq!(search[2], "5/12");
        assert!(search[1].ends_with("profiles"));
    }
}
