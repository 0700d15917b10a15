//! Search result processing
//!
//! Collects every raw `_results.txt` table below the results directory,
//! decodes them with [`tblout`], normalizes the rows with [`normalize`], and
//! writes `processed_hmmer_results.csv`.

pub mod normalize;
pub mod tblout;

pub use normalize::{normalize, SearchHit};
pub use tblout::{parse_file, RawHit};

use crate::config::PipelinePaths;
use crate::progress::stage_progress;
use crate::search::RESULTS_SUFFIX;
use complexscan_common::{Result, ScanError};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use walkdir::WalkDir;

/// Outcome of one processing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessSummary {
    pub files: usize,
    pub raw_hits: usize,
    pub malformed_lines: usize,
    /// Files that could not be read; they contribute no hits
    pub failed_files: usize,
    pub rows: usize,
    /// Written table, absent when there was nothing to write
    pub output: Option<PathBuf>,
}

/// Every `*_results.txt` below `dir`, depth-first in file-name order
pub fn discover_result_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(RESULTS_SUFFIX)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Write rows as CSV with a header line
pub fn write_table(path: &Path, rows: &[SearchHit]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Parse, normalize and write all search results
///
/// A missing results directory is a configuration fault. An unreadable file
/// is logged and contributes no hits; files with no hits only produce
/// warnings. An integrity fault in a profile name aborts before anything is
/// written. When no hits remain, a table left by an earlier run is removed.
pub fn process_results(paths: &PipelinePaths) -> Result<ProcessSummary> {
    let results_dir = &paths.results_dir;
    if !results_dir.is_dir() {
        return Err(ScanError::missing_input(results_dir.clone()));
    }

    let files = discover_result_files(results_dir)?;
    let mut summary = ProcessSummary {
        files: files.len(),
        ..Default::default()
    };
    if files.is_empty() {
        error!(dir = %results_dir.display(), "❌ No result files found");
        return Ok(summary);
    }
    info!(count = files.len(), dir = %results_dir.display(), "📂 Found result files");

    let pb = stage_progress(files.len(), "Processing HMMER results");
    let mut raw = Vec::new();
    for file in &files {
        match parse_file(file) {
            Ok(table) => {
                summary.malformed_lines += table.malformed.len();
                raw.extend(table.hits);
            },
            Err(e) => {
                error!(file = %file.display(), error = %e, "❌ Error processing file");
                summary.failed_files += 1;
            },
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    summary.raw_hits = raw.len();

    if raw.is_empty() {
        warn!("⚠️ No valid results found after processing all files");
        let stale = paths.processed_results_file();
        if stale.exists() {
            fs::remove_file(&stale)?;
            info!(file = %stale.display(), "Removed table from an earlier run");
        }
        return Ok(summary);
    }

    let rows = normalize(raw)?;
    summary.rows = rows.len();

    let output = paths.processed_results_file();
    write_table(&output, &rows)?;
    info!(rows = rows.len(), output = %output.display(), "✅ Processed results saved");
    summary.output = Some(output);

    Ok(summary)
}
