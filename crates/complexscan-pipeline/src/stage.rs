//! Stage completion tracked by file presence
//!
//! There is no job ledger. A unit of work is done when its output file exists
//! and is non-empty, so re-running a stage only redoes what is missing.

use crate::config::PipelinePaths;
use complexscan_common::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Whether a stage output exists and is non-empty
pub fn is_done(path: impl AsRef<Path>) -> bool {
    fs::metadata(path.as_ref())
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Regular files in `dir` with the given extension, sorted by file name
///
/// A missing directory yields an empty list.
pub fn list_files(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File stem as an owned string
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Per-stage output counts, read from disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStatus {
    pub cds_sequence_files: usize,
    pub interpro_sequence_files: usize,
    pub staged_subunits: usize,
    pub concatenated_files: usize,
    pub clustered_files: usize,
    pub alignments: usize,
    pub profiles: usize,
    pub proteomes: usize,
    pub search_results: usize,
    pub expected_search_results: usize,
    pub processed_table: bool,
}

impl PipelineStatus {
    /// Inspect every stage directory
    pub fn collect(paths: &PipelinePaths) -> Result<Self> {
        let staged_subunits = if paths.combined_dir.is_dir() {
            fs::read_dir(&paths.combined_dir)?
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .count()
        } else {
            0
        };

        let profiles = list_files(&paths.profiles_dir, "hmm")?.len();
        let proteomes = list_files(&paths.proteomes_dir, "faa")?.len();

        let search_results = WalkDir::new(paths.search_results_root())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.file_name().to_string_lossy().ends_with("_results.txt"))
            .count();

        Ok(Self {
            cds_sequence_files: list_files(&paths.cds_seqs_dir, "faa")?.len(),
            interpro_sequence_files: list_files(&paths.interpro_seqs_dir, "faa")?.len(),
            staged_subunits,
            concatenated_files: list_files(&paths.clustered_dir, "faa")?.len(),
            clustered_files: list_files(&paths.clustered_dir, "fasta")?.len(),
            alignments: list_files(&paths.msa_dir, "fasta")?.len(),
            profiles,
            proteomes,
            search_results,
            expected_search_results: profiles * proteomes,
            processed_table: is_done(paths.processed_results_file()),
        })
    }
}
