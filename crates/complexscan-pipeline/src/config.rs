//! Pipeline directory layout and external tool settings

use complexscan_common::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Tool Defaults
// ============================================================================

/// Default thread count handed to mmseqs, mafft and hmmbuild.
pub const DEFAULT_THREADS: usize = 8;

/// Default minimum sequence identity for clustering.
pub const DEFAULT_CLUSTER_MIN_SEQ_ID: f64 = 0.85;

/// Default iteration cap for MAFFT's iterative refinement.
pub const DEFAULT_MAFFT_MAX_ITERATE: u32 = 400;

/// Default hmmbuild `--symfrac`.
pub const DEFAULT_SYMFRAC: f64 = 0.6;

/// Default hmmbuild `--fragthresh`.
pub const DEFAULT_FRAGTHRESH: f64 = 0.3;

/// Maximum CPUs given to hmmsearch on battery-capable hosts.
pub const DEFAULT_LAPTOP_CPU_CAP: usize = 4;

/// Pause between profiles during the search stage (5 minutes).
pub const DEFAULT_COOLDOWN_SECS: u64 = 300;

/// Name of the final normalized table inside the results directory.
pub const PROCESSED_RESULTS_FILE: &str = "processed_hmmer_results.csv";

/// Directory layout of a pipeline run
///
/// All paths derive from one base directory, mirroring the layout produced by
/// the project bootstrap step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePaths {
    /// Per-subunit sequences translated from genome CDS
    pub cds_seqs_dir: PathBuf,
    /// Per-subunit reference sequences fetched from InterPro
    pub interpro_seqs_dir: PathBuf,
    /// Staging area with one subdirectory per subunit
    pub combined_dir: PathBuf,
    /// Concatenated and clustered sequence files
    pub clustered_dir: PathBuf,
    /// Multiple sequence alignments
    pub msa_dir: PathBuf,
    /// HMM profiles
    pub profiles_dir: PathBuf,
    /// One protein FASTA per organism
    pub proteomes_dir: PathBuf,
    /// Raw search output and the processed table
    pub results_dir: PathBuf,
    /// Stage log files
    pub log_dir: PathBuf,
}

impl PipelinePaths {
    /// Derive the standard layout under `base`
    pub fn from_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let hmm = base.join("data").join("hmm_data");
        Self {
            cds_seqs_dir: hmm.join("cds_prot_seqs"),
            interpro_seqs_dir: hmm.join("interpro_prot_seqs"),
            combined_dir: hmm.join("combined_interpro_cds_seqs"),
            clustered_dir: hmm.join("clustered_prot_seqs"),
            msa_dir: hmm.join("clustered_msa_seqs"),
            profiles_dir: hmm.join("profiles"),
            proteomes_dir: base.join("data").join("sequence_data").join("proteomes"),
            results_dir: hmm.join("results"),
            log_dir: base.join("logs"),
        }
    }

    /// Scratch directory root for clustering databases
    pub fn cluster_scratch_root(&self) -> PathBuf {
        self.clustered_dir.join("tmp")
    }

    /// Directory holding per-profile search results
    ///
    /// Named after the profiles directory so results from different profile
    /// sets can share one results root.
    pub fn search_results_root(&self) -> PathBuf {
        let profiles_name = self
            .profiles_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "profiles".into());
        self.results_dir.join(profiles_name)
    }

    /// Path of the final normalized table
    pub fn processed_results_file(&self) -> PathBuf {
        self.results_dir.join(PROCESSED_RESULTS_FILE)
    }
}

/// External tool binaries and fixed parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Threads for clustering, alignment and profile building
    pub threads: usize,
    /// Minimum sequence identity for clustering, in (0, 1]
    pub cluster_min_seq_id: f64,
    pub mafft_max_iterate: u32,
    pub hmmbuild_symfrac: f64,
    pub hmmbuild_fragthresh: f64,
    /// CPU cap for hmmsearch on laptops
    pub laptop_cpu_cap: usize,
    /// Pause between profiles during search, in seconds
    pub cooldown_secs: u64,
    pub mmseqs_bin: String,
    pub mafft_bin: String,
    pub hmmbuild_bin: String,
    pub hmmsearch_bin: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            cluster_min_seq_id: DEFAULT_CLUSTER_MIN_SEQ_ID,
            mafft_max_iterate: DEFAULT_MAFFT_MAX_ITERATE,
            hmmbuild_symfrac: DEFAULT_SYMFRAC,
            hmmbuild_fragthresh: DEFAULT_FRAGTHRESH,
            laptop_cpu_cap: DEFAULT_LAPTOP_CPU_CAP,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            mmseqs_bin: "mmseqs".to_string(),
            mafft_bin: "mafft".to_string(),
            hmmbuild_bin: "hmmbuild".to_string(),
            hmmsearch_bin: "hmmsearch".to_string(),
        }
    }
}

impl ToolSettings {
    /// Clustering threshold as an integer percentage, used in file names
    pub fn threshold_percent(&self) -> u32 {
        (self.cluster_min_seq_id * 100.0).round() as u32
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }

    /// Validate tool settings
    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(ScanError::config("threads must be at least 1"));
        }

        if !(self.cluster_min_seq_id > 0.0 && self.cluster_min_seq_id <= 1.0) {
            return Err(ScanError::config(format!(
                "cluster_min_seq_id must be in (0, 1], got {}",
                self.cluster_min_seq_id
            )));
        }

        if self.laptop_cpu_cap == 0 {
            return Err(ScanError::config("laptop_cpu_cap must be at least 1"));
        }

        for (name, bin) in [
            ("mmseqs_bin", &self.mmseqs_bin),
            ("mafft_bin", &self.mafft_bin),
            ("hmmbuild_bin", &self.hmmbuild_bin),
            ("hmmsearch_bin", &self.hmmsearch_bin),
        ] {
            if bin.trim().is_empty() {
                return Err(ScanError::config(format!("{} cannot be empty", name)));
            }
        }

        Ok(())
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub paths: PipelinePaths,
    pub tools: ToolSettings,
}

impl PipelineConfig {
    /// Standard layout under `base` with default tool settings
    pub fn from_base_dir(base: impl AsRef<Path>) -> Self {
        Self {
            paths: PipelinePaths::from_base_dir(base),
            tools: ToolSettings::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.tools.validate()
    }
}
