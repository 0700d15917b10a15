//! Sequence aggregation
//!
//! Gathers per-subunit protein FASTA files from the two upstream sources
//! (InterPro reference fetch and genome CDS translation), stages byte-for-byte
//! copies into one directory per subunit, and concatenates each subunit's
//! copies into a single `<SUBUNIT>.faa` in the clustering working area.
//!
//! Files are never re-parsed: every input is assumed to already be valid
//! FASTA, and concatenation is raw byte concatenation.

use crate::config::PipelinePaths;
use crate::progress::stage_progress;
use crate::stage::list_files;
use crate::subunit::SubunitId;
use complexscan_common::{Result, ScanError};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension of every aggregated sequence file
pub const SEQUENCE_EXTENSION: &str = "faa";

/// Staged copies for one subunit, in concatenation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedSubunit {
    pub subunit: SubunitId,
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Outcome of one aggregation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateSummary {
    /// Input files found across both sources
    pub gathered: usize,
    /// Files copied into the staging area
    pub staged: usize,
    /// Files that could not be copied
    pub skipped: usize,
    /// Concatenated outputs written
    pub outputs: Vec<PathBuf>,
}

/// Path of the concatenated file for a subunit
pub fn concatenated_path(clustered_dir: &Path, subunit: &SubunitId) -> PathBuf {
    clustered_dir.join(format!("{}.{}", subunit, SEQUENCE_EXTENSION))
}

/// Pair every `.faa` file in `dir` with the subunit named by its leading token
///
/// Files whose name yields no subunit are logged and ignored.
pub fn gather_sequences(dir: &Path) -> Result<Vec<(SubunitId, PathBuf)>> {
    let mut sequences = Vec::new();
    for path in list_files(dir, SEQUENCE_EXTENSION)? {
        match SubunitId::from_file_name(&path) {
            Some(subunit) => sequences.push((subunit, path)),
            None => warn!(file = %path.display(), "No subunit in file name, skipping"),
        }
    }
    info!(
        count = sequences.len(),
        dir = %dir.display(),
        "✅ Gathered sequence files"
    );
    Ok(sequences)
}

/// Copy gathered files into `<combined_dir>/<SUBUNIT>/`
///
/// `sources` is processed in order and the returned file lists keep that
/// order, which fixes the concatenation order. A file that cannot be copied
/// is logged and skipped.
pub fn stage_sequences(
    sources: &[Vec<(SubunitId, PathBuf)>],
    combined_dir: &Path,
) -> Result<(Vec<StagedSubunit>, usize)> {
    fs::create_dir_all(combined_dir)?;

    let mut staged: BTreeMap<SubunitId, StagedSubunit> = BTreeMap::new();
    let mut skipped = 0;

    for source in sources {
        for (subunit, source_path) in source {
            let entry = staged.entry(subunit.clone()).or_insert_with(|| StagedSubunit {
                subunit: subunit.clone(),
                dir: combined_dir.join(subunit.as_str()),
                files: Vec::new(),
            });
            fs::create_dir_all(&entry.dir)?;

            let Some(file_name) = source_path.file_name() else {
                continue;
            };
            let destination = entry.dir.join(file_name);

            if entry.files.contains(&destination) {
                warn!(
                    subunit = %subunit,
                    file = %source_path.display(),
                    "Duplicate file name across sources, keeping the first copy"
                );
                skipped += 1;
                continue;
            }

            match fs::copy(source_path, &destination) {
                Ok(bytes) => {
                    debug!(subunit = %subunit, bytes, file = %destination.display(), "Staged");
                    entry.files.push(destination);
                },
                Err(e) => {
                    warn!(
                        subunit = %subunit,
                        file = %source_path.display(),
                        error = %e,
                        "⚠️ Could not stage sequence file, skipping"
                    );
                    skipped += 1;
                },
            }
        }
    }

    Ok((staged.into_values().collect(), skipped))
}

/// Concatenate one subunit's staged files into `output`
///
/// Returns `false` and leaves no file behind when the staged files hold no
/// bytes at all.
pub fn concatenate_subunit(staged: &StagedSubunit, output: &Path) -> Result<bool> {
    let mut total: u64 = 0;
    for file in &staged.files {
        total += fs::metadata(file)?.len();
    }

    if total == 0 {
        if output.exists() {
            fs::remove_file(output)?;
        }
        return Ok(false);
    }

    let mut writer = BufWriter::new(File::create(output)?);
    for file in &staged.files {
        let mut reader = File::open(file)?;
        io::copy(&mut reader, &mut writer)?;
    }
    writer.flush()?;
    Ok(true)
}

/// Remove `<SUBUNIT>.faa` files in `clustered_dir` that this run did not write
///
/// A subunit that has disappeared from both sources would otherwise be
/// clustered again from an old concatenation.
pub fn remove_stale_outputs(clustered_dir: &Path, outputs: &[PathBuf]) -> Result<()> {
    for path in list_files(clustered_dir, SEQUENCE_EXTENSION)? {
        if !outputs.contains(&path) {
            warn!(file = %path.display(), "⚠️ Removing concatenated file from an earlier run");
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Run the whole aggregation stage
///
/// InterPro reference sequences are staged before genome-derived sequences.
/// A missing source directory is logged; both missing is a configuration
/// fault.
pub fn aggregate(paths: &PipelinePaths) -> Result<AggregateSummary> {
    let interpro_present = paths.interpro_seqs_dir.is_dir();
    let cds_present = paths.cds_seqs_dir.is_dir();

    if !interpro_present && !cds_present {
        return Err(ScanError::missing_input(&paths.cds_seqs_dir));
    }

    let mut sources = Vec::new();
    for (present, dir) in [
        (interpro_present, &paths.interpro_seqs_dir),
        (cds_present, &paths.cds_seqs_dir),
    ] {
        if present {
            sources.push(gather_sequences(dir)?);
        } else {
            warn!(dir = %dir.display(), "⚠️ Sequence source directory missing");
        }
    }

    let gathered = sources.iter().map(Vec::len).sum();
    let (staged, skipped) = stage_sequences(&sources, &paths.combined_dir)?;
    info!(
        subunits = staged.len(),
        dir = %paths.combined_dir.display(),
        "✅ Sequences staged"
    );

    fs::create_dir_all(&paths.clustered_dir)?;
    let pb = stage_progress(staged.len(), "Concatenating sequences");
    let mut outputs = Vec::new();

    for subunit in &staged {
        let output = concatenated_path(&paths.clustered_dir, &subunit.subunit);
        if concatenate_subunit(subunit, &output)? {
            info!(subunit = %subunit.subunit, "✅ Concatenated sequences");
            outputs.push(output);
        } else {
            warn!(subunit = %subunit.subunit, "⚠️ No sequences for subunit, nothing written");
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    remove_stale_outputs(&paths.clustered_dir, &outputs)?;

    Ok(AggregateSummary {
        gathered,
        staged: staged.iter().map(|s| s.files.len()).sum(),
        skipped,
        outputs,
    })
}
