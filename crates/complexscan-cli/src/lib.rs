//! complexscan CLI Library
//!
//! Command-line front end for the complexscan profile pipeline.
//!
//! # Overview
//!
//! - **Aggregation**: merge per-subunit sequence files (`complexscan aggregate`)
//! - **Profile construction**: cluster, align and build HMMs
//!   (`complexscan cluster|align|profile|build`)
//! - **Search**: power-aware hmmsearch over all proteomes (`complexscan search`)
//! - **Processing**: normalize search hits into one table (`complexscan process`)
//! - **Status**: what each stage has produced so far (`complexscan status`)
//! - **Subunits**: check how a gene symbol is labelled (`complexscan subunit`)

pub mod commands;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use error::{CliError, Result};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Log file for the profile construction stages
pub const PIPELINE_LOG: &str = "hmm_pipeline.log";

/// Log file for the search stage
pub const SEARCH_LOG: &str = "hmmer_search.log";

/// Log file for result processing
pub const RESULTS_LOG: &str = "hmmer_results.log";

/// complexscan - build and search profile HMMs for protein complex subunits
#[derive(Parser, Debug)]
#[command(name = "complexscan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to ./complexscan.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root holding data/ and logs/
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Threads for clustering, alignment and profile building
    #[arg(long, global = true)]
    pub threads: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the CLI reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge InterPro and CDS sequence files into one file per subunit
    Aggregate,

    /// Cluster each subunit's sequences with MMseqs2
    Cluster {
        /// Redo units whose output already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Align each clustered file with MAFFT
    Align {
        /// Redo units whose output already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Build an HMM profile from each alignment
    Profile {
        /// Redo units whose output already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Aggregate, cluster, align and build profiles in one go
    Build {
        /// Redo units whose output already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Search every profile against every proteome
    Search {
        /// Keep running on a laptop that is on battery instead of shutting down
        #[arg(long)]
        force_run: bool,

        /// Redo searches whose result file already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Parse, deduplicate and tabulate all search results
    Process,

    /// Show what each stage has produced
    Status {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the cleaned symbol and subunit label for a gene symbol
    Subunit {
        /// Raw gene symbol, e.g. "nuoA" or "nuo-C [h"
        symbol: String,

        /// Protein description, used to recognise fused subunits
        #[arg(short, long)]
        description: Option<String>,
    },
}

impl Commands {
    /// Stage log file this command writes to, if any
    pub fn log_file_name(&self) -> Option<&'static str> {
        match self {
            Commands::Aggregate
            | Commands::Cluster { .. }
            | Commands::Align { .. }
            | Commands::Profile { .. }
            | Commands::Build { .. } => Some(PIPELINE_LOG),
            Commands::Search { .. } => Some(SEARCH_LOG),
            Commands::Process => Some(RESULTS_LOG),
            Commands::Status { .. } | Commands::Subunit { .. } => None,
        }
    }

    /// Whether the command reads pipeline configuration at all
    pub fn needs_config(&self) -> bool {
        !matches!(self, Commands::Subunit { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_flags() {
        let cli = Cli::parse_from(["complexscan", "search", "--force-run"]);
        match cli.command {
            Some(Commands::Search { force_run, force }) => {
                assert!(force_run);
                assert!(!force);
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["complexscan", "build", "--base-dir", "/work", "--threads", "4"]);
        assert_eq!(cli.base_dir, Some(PathBuf::from("/work")));
        assert_eq!(cli.threads, Some(4));
    }

    #[test]
    fn test_stage_log_files() {
        assert_eq!(Commands::Aggregate.log_file_name(), Some(PIPELINE_LOG));
        assert_eq!(
            Commands::Search { force_run: false, force: false }.log_file_name(),
            Some(SEARCH_LOG)
        );
        assert_eq!(Commands::Process.log_file_name(), Some(RESULTS_LOG));
        assert_eq!(Commands::Status { json: true }.log_file_name(), None);
    }
}
