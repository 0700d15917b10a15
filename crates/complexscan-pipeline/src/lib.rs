//! complexscan pipeline
//!
//! Builds profile HMMs for the subunits of a protein complex and searches
//! them against proteomes:
//!
//! ```text
//! aggregate → cluster (MMseqs2) → align (MAFFT) → profile (hmmbuild)
//!                                   power gate → search (hmmsearch) → process
//! ```
//!
//! Every stage reads one directory and writes another. Whether a unit of
//! work is done is decided by the presence of its output file (see
//! [`stage`]), so any stage can be re-run after an interruption. External
//! tools are invoked through [`executor::CommandRunner`].
//!
//! # Example
//!
//! ```no_run
//! use complexscan_pipeline::config::PipelineConfig;
//! use complexscan_pipeline::executor::ProcessRunner;
//! use complexscan_pipeline::{aggregate, build};
//!
//! # async fn run() -> complexscan_common::Result<()> {
//! let config = PipelineConfig::from_base_dir(".");
//! aggregate::aggregate(&config.paths)?;
//! build::build_profiles(&ProcessRunner, &config, false).await?;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod aggregate;
pub mod build;
pub mod config;
pub mod executor;
pub mod power;
pub mod progress;
pub mod results;
pub mod search;
pub mod stage;
pub mod subunit;

#[cfg(test)]
mod testing;

pub use config::{PipelineConfig, PipelinePaths, ToolSettings};
pub use subunit::{SubunitFamily, SubunitId};
